use bytes::Bytes;
use portrait_core::StorageKey;

use crate::error::BlobError;
use crate::store::BlobStore;
use crate::types::BlobLookup;

fn key(path: &str) -> StorageKey {
    StorageKey::parse(path).expect("conformance keys are valid")
}

/// Run the blob store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), BlobError> {
    test_get_missing(store).await?;
    test_put_and_get(store).await?;
    test_put_overwrites(store).await?;
    test_keys_are_independent(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn BlobStore) -> Result<(), BlobError> {
    let lookup = store.get(&key("conformance/missing.webp")).await?;
    assert_eq!(lookup, BlobLookup::NotFound, "missing object should be NotFound");
    Ok(())
}

async fn test_put_and_get(store: &dyn BlobStore) -> Result<(), BlobError> {
    let k = key("conformance/put-get.webp");
    store
        .put(&k, Bytes::from_static(b"\x52\x49\x46\x46 image"), "image/webp")
        .await?;
    let Some(obj) = store.get(&k).await?.into_option() else {
        panic!("stored object should be found");
    };
    assert_eq!(obj.data.as_ref(), b"\x52\x49\x46\x46 image");
    assert_eq!(obj.content_type.as_deref(), Some("image/webp"));
    Ok(())
}

async fn test_put_overwrites(store: &dyn BlobStore) -> Result<(), BlobError> {
    let k = key("conformance/overwrite.webp");
    store.put(&k, Bytes::from_static(b"first"), "image/webp").await?;
    store.put(&k, Bytes::from_static(b"second"), "image/png").await?;
    let Some(obj) = store.get(&k).await?.into_option() else {
        panic!("overwritten object should be found");
    };
    assert_eq!(obj.data.as_ref(), b"second", "put should overwrite");
    assert_eq!(obj.content_type.as_deref(), Some("image/png"));
    Ok(())
}

async fn test_keys_are_independent(store: &dyn BlobStore) -> Result<(), BlobError> {
    let a = key("conformance/a.webp");
    let b = key("conformance/b.webp");
    store.put(&a, Bytes::from_static(b"a"), "image/webp").await?;
    assert!(!store.get(&b).await?.is_found(), "writing a must not create b");
    Ok(())
}
