//! Output generation for assessed articles.
//!
//! # Submodules
//!
//! - [`json`]: export file (and its reader) plus the raw fetched-articles dump
//! - [`markdown`]: human-readable report for stdout, files and the
//!   interactive `show` command

pub mod json;
pub mod markdown;
