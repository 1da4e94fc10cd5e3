//! Adapters implementing the domain ports.
//!
//! - `sqlite`: durable session snapshots and the project catalog
//! - `memory`: in-process stores for tests and embedding
//! - `recommenders`: reasoning service clients

pub mod memory;
pub mod recommenders;
pub mod sqlite;
