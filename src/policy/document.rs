//! Deny-policy document shape.

use crate::error::{EvictError, Result};
use serde::Serialize;

/// Policy language version stamped on every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Top-level policy document. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: &'static str,
    pub action: &'static str,
    pub resource: &'static str,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Condition {
    StringLike(UserIdMatch),
    StringEquals(SourceIdentityMatch),
}

/// Matches sessions whose user id ends in `:<principal>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdMatch {
    #[serde(rename = "aws:userid")]
    pub user_id: Vec<String>,
}

/// Matches sessions whose source identity is exactly the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceIdentityMatch {
    #[serde(rename = "aws:SourceIdentity")]
    pub source_identity: Vec<String>,
}

impl PolicyDocument {
    /// Build the two deny statements for `excluded_users`, keeping their order.
    pub fn for_excluded_users(excluded_users: &[String]) -> Self {
        let deny = |condition| Statement {
            effect: "Deny",
            action: "*",
            resource: "*",
            condition,
        };

        Self {
            version: POLICY_VERSION,
            statement: vec![
                deny(Condition::StringLike(UserIdMatch {
                    user_id: excluded_users
                        .iter()
                        .map(|user| format!("*:{}", user))
                        .collect(),
                })),
                deny(Condition::StringEquals(SourceIdentityMatch {
                    source_identity: excluded_users.to_vec(),
                })),
            ],
        }
    }

    /// Serialize with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            EvictError::UpstreamFailure(format!("failed to serialize policy document: {}", e))
        })
    }
}

/// Render the stored policy text for `excluded_users`.
pub fn render_policy(excluded_users: &[String]) -> Result<String> {
    PolicyDocument::for_excluded_users(excluded_users).to_json()
}
