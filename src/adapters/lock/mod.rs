//! Transaction lock adapters.
//!
//! - `InMemoryTransactionLock` - Single-process lock for tests and local runs
//! - `RedisTransactionLock` - `SET NX PX` lock shared across instances

mod in_memory;
mod redis;

pub use in_memory::InMemoryTransactionLock;
pub use redis::RedisTransactionLock;
