//! Policy distribution.
//!
//! Compiles the excluded principals into a deny-all policy document and
//! hands it to a [`PolicyPublisher`]. Consumers diff the stored document, so
//! [`render_policy`] output must stay byte-for-byte stable.

mod document;
mod publisher;

pub use document::{render_policy, PolicyDocument, POLICY_VERSION};
pub use publisher::{FilePolicyPublisher, PolicyPublisher, StoredPolicy};
