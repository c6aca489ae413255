//! File handler module for Nugget Extract
//!
//! Handles all file system operations including:
//! - Reading source files with encoding detection
//! - Recursive scanning of source trees with white/black list rules
//! - Parallel parsing into a shared catalog

pub mod io;
pub mod scanner;

pub use io::*;
pub use scanner::*;
