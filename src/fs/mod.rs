//! Filesystem utilities for evict.
//!
//! Record files are always replaced whole, never edited in place.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
