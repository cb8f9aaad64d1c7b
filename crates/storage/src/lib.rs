//! Storage interface for switchyard: abstract CRUD over workflow state and
//! resource discovery, plus a Postgres implementation and an in-memory test
//! double, collapsed around a single `Storage` trait so callers (engine,
//! api, cli) depend on an interface, not a concrete pool.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::StorageError;
pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use traits::Storage;
