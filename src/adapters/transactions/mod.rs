//! Transaction repository adapters.
//!
//! - `InMemoryTransactionRepository` - HashMap-backed store for tests and local runs

mod in_memory;

pub use in_memory::InMemoryTransactionRepository;
