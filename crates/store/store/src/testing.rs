use portrait_core::Address;

use crate::error::RepositoryError;
use crate::repository::PortraitRepository;

fn addr(raw: &str) -> Address {
    Address::parse(raw).expect("conformance addresses are valid")
}

/// Run the repository conformance test suite.
///
/// Call this from your backend's test module with a fresh, empty repository.
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_repository_conformance_tests(
    repo: &dyn PortraitRepository,
) -> Result<(), RepositoryError> {
    test_find_missing(repo).await?;
    test_insert_then_find(repo).await?;
    test_lookup_is_case_insensitive(repo).await?;
    test_update_keeps_single_record(repo).await?;
    test_update_retains_prompt(repo).await?;
    test_set_image_url(repo).await?;
    test_list_all_sorted(repo).await?;
    Ok(())
}

async fn test_find_missing(repo: &dyn PortraitRepository) -> Result<(), RepositoryError> {
    let found = repo.find_by_address(&addr("0xmissing")).await?;
    assert!(found.is_none(), "lookup of unknown address should be None");
    Ok(())
}

async fn test_insert_then_find(repo: &dyn PortraitRepository) -> Result<(), RepositoryError> {
    let a = addr("0xinsert");
    let stored = repo
        .upsert(&a, "/api/image/portraits/0xinsert.webp", Some("a fox"))
        .await?;
    assert_eq!(stored.address, a);
    assert_eq!(stored.created_at, stored.updated_at);

    let found = repo.find_by_address(&a).await?.expect("record should exist");
    assert_eq!(found, stored);
    assert_eq!(found.prompt.as_deref(), Some("a fox"));
    Ok(())
}

async fn test_lookup_is_case_insensitive(
    repo: &dyn PortraitRepository,
) -> Result<(), RepositoryError> {
    repo.upsert(&addr("0xCaSe"), "/case.webp", None).await?;
    let lower = repo.find_by_address(&addr("0xcase")).await?;
    let upper = repo.find_by_address(&addr("0XCASE")).await?;
    assert!(lower.is_some());
    assert_eq!(lower, upper, "lookups must ignore address case");
    Ok(())
}

async fn test_update_keeps_single_record(
    repo: &dyn PortraitRepository,
) -> Result<(), RepositoryError> {
    let a = addr("0xupdate");
    let first = repo.upsert(&a, "/first.webp", None).await?;
    let second = repo.upsert(&a, "/second.webp", None).await?;

    assert_eq!(second.image_url, "/second.webp");
    assert_eq!(second.created_at, first.created_at, "created_at is fixed");
    assert!(
        second.updated_at > first.updated_at,
        "updated_at must strictly increase"
    );

    let count = repo
        .list_all()
        .await?
        .into_iter()
        .filter(|r| r.address == a)
        .count();
    assert_eq!(count, 1, "upsert must not create a second record");
    Ok(())
}

async fn test_update_retains_prompt(repo: &dyn PortraitRepository) -> Result<(), RepositoryError> {
    let a = addr("0xprompt");
    repo.upsert(&a, "/p1.webp", Some("an owl")).await?;
    let kept = repo.upsert(&a, "/p2.webp", None).await?;
    assert_eq!(kept.prompt.as_deref(), Some("an owl"));

    let replaced = repo.upsert(&a, "/p3.webp", Some("a heron")).await?;
    assert_eq!(replaced.prompt.as_deref(), Some("a heron"));
    Ok(())
}

async fn test_set_image_url(repo: &dyn PortraitRepository) -> Result<(), RepositoryError> {
    let a = addr("0xrewrite");
    let before = repo.upsert(&a, "https://old/bucket/x.webp", None).await?;
    assert!(repo.set_image_url(&a, "/api/image/x.webp").await?);

    let after = repo.find_by_address(&a).await?.expect("record should exist");
    assert_eq!(after.image_url, "/api/image/x.webp");
    assert_eq!(after.updated_at, before.updated_at);

    assert!(!repo.set_image_url(&addr("0xnobody"), "/x").await?);
    Ok(())
}

async fn test_list_all_sorted(repo: &dyn PortraitRepository) -> Result<(), RepositoryError> {
    let all = repo.list_all().await?;
    let mut sorted = all.clone();
    sorted.sort_by(|a, b| a.address.cmp(&b.address));
    assert_eq!(all, sorted, "list_all must be ordered by address");
    Ok(())
}
