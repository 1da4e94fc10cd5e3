//! Domain layer for the deploytrack tracking engine
//!
//! This module contains the tracking models, the error taxonomy and the
//! ports the engine depends on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorKind};
