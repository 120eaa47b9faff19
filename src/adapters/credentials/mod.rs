//! Credential store adapters.
//!
//! - `InMemoryCredentialStore` - Credentials loaded from configuration

mod in_memory;

pub use in_memory::InMemoryCredentialStore;
