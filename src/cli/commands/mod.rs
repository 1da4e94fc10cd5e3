//! CLI command implementations.

pub mod alert;
pub mod analysis;
pub mod init;
pub mod project;
pub mod track;
