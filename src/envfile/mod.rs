//! Persistent environment shared across process invocations
//!
//! A single JSON record on the host holds environment variables that one
//! process recorded and a later, unrelated process should also see.
//!
//! - `EnvStore::apply` loads the record and applies it to this process.
//! - `EnvStore::merge_and_apply` merges new variables over the record,
//!   persists the result and applies it.
//!
//! Neither returns an error. Failures are logged at debug level and reported
//! in the returned outcome; the fallback is always to carry on.

pub mod apply;
pub mod error;
pub mod lock;
pub mod merge;
pub mod record;
pub mod store;

pub use record::{EnvMap, Record};
pub use store::{ApplyOutcome, EnvStore, LoadStatus, LockStatus, MergeOutcome, PersistStatus, StoreOptions};
