mod context;
mod store;

pub use context::{SessionContext, KEY_PREFIX};
pub use store::{SessionStore, StoreError, DEFAULT_QUOTA_BYTES, DEFAULT_TTL_SECS};
