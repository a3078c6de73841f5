//! Dump the installed and available yum packages as flat lines for a
//! configuration-management provider.

pub mod backend;
pub mod commands;
pub mod error;
pub mod output;
pub mod package;
pub mod retry;
pub mod runtime;

pub use commands::{Config, dump};
pub use error::DumpError;
