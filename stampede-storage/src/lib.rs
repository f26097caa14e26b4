//! Result persistence for Stampede
//!
//! Defines the repository trait the orchestrator stores run records through,
//! plus an in-memory implementation. The trait seam keeps the engine free of
//! any concrete store; a database-backed implementation satisfies the same
//! contract.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::StorageError;
pub use memory::InMemoryResultRepository;
pub use repository::ResultRepository;
