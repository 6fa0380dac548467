//! Event intake.
//!
//! Two independent paths feed and drain the coordination store:
//! - Lifecycle events (user disabled, enabled, deleted) resolve the user to a
//!   principal and exclude or restore it
//! - Change events on the exclusion list trigger a policy sync under the lock
//!
//! Each handler call is a self-contained unit of work. Nothing is shared
//! between calls except the records in the table.

mod change;
mod lifecycle;
mod sync;


pub use change::{handle_change_event, ChangeEvent, ChangeOutcome};
pub use lifecycle::{handle_lifecycle_event, LifecycleAction, LifecycleEvent, LifecycleOutcome};
pub use sync::{sync_policy, SyncReport};
