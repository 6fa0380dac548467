//! Exit code constants for the evict CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, uninitialized home, invalid config)
//! - 2: Concurrent modification (a conditional list write lost a race)
//! - 3: Upstream failure (principal resolution or policy distribution)
//! - 4: Lock failure (conflict or timeout)
//! - 5: Store failure (backend I/O or corrupt record)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing home directory, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// A version-conditioned write lost a race; re-read and retry.
pub const CONFLICT: i32 = 2;

/// A collaborator (directory or policy store) failed.
pub const UPSTREAM_FAILURE: i32 = 3;

/// Lock acquisition failure: creation race lost or lock never freed.
pub const LOCK_FAILURE: i32 = 4;

/// Backend read, write, or decode failure.
pub const STORE_FAILURE: i32 = 5;
