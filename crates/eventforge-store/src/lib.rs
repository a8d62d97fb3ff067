//! Persistent store sinks for generated datasets.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod publisher;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::{PgStore, RetryPolicy, connect_with_retry};
pub use publisher::publish_dataset;
pub use store::Store;
