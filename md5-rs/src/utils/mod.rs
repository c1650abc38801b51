//! Shared utilities for the md5-rs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
