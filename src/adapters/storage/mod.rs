//! Storage Adapters
//!
//! Implementations of the SessionRepository port.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemorySessionRepository;
//!
//! let repo = InMemorySessionRepository::new();
//! ```

mod in_memory_session_repository;

pub use in_memory_session_repository::InMemorySessionRepository;
