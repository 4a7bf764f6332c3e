//! Requester identity: who is asking, and what they may read.
//!
//! The host hands the router a user id. The [`UserDirectory`] turns that id
//! into an [`Identity`], which the knowledge store then uses to filter
//! collections. Failing to resolve an identity is the one failure that
//! aborts a routing invocation.

use crate::error::IdentityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Coarse permission level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can read every collection
    Admin,
    /// Reads own, public, and explicitly shared collections
    #[default]
    User,
    /// Account awaiting approval; reads nothing but public collections
    Pending,
}

/// A resolved requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub role: UserRole,

    /// Groups the user belongs to, for shared-collection access
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
}

impl Identity {
    /// A plain user with no group memberships.
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::User,
            group_ids: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Add a group membership.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_ids.push(group_id.into());
        self
    }
}

/// Lookup of users by id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user id into a full identity.
    async fn resolve(&self, user_id: &str) -> Result<Identity, IdentityError>;
}
