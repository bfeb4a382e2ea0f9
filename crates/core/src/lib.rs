//! Domain types shared by every portrait crate: normalized addresses,
//! storage keys, the persisted record and the client-side workflow phase.

pub mod address;
pub mod error;
pub mod key;
pub mod phase;
pub mod record;

pub use address::{Address, MAX_ADDRESS_LEN};
pub use error::{AddressError, KeyError};
pub use key::{
    DEFAULT_PUBLIC_BASE_URL, ImageFormat, PORTRAIT_PREFIX, StorageKey, image_url,
    rewrite_legacy_url,
};
pub use phase::PortraitPhase;
pub use record::{PortraitRecord, next_updated_at, normalize_prompt};
