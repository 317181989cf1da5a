//! Authorization rules for thread moderation actions

use serde::{Deserialize, Serialize};

/// Users that may always mark threads as solved.
pub const DEFAULT_BYPASS_USERS: [u64; 1] = [189020382559207425];

/// Roles whose holders may mark any thread as solved.
pub const DEFAULT_MODERATOR_ROLES: [u64; 1] = [370280974593818644];

/// Who may close a thread besides its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModeratorPolicy {
    /// User IDs that bypass every check
    #[serde(default = "default_bypass_users")]
    pub bypass_users: Vec<u64>,
    /// Role IDs granting moderator rights
    #[serde(default = "default_moderator_roles")]
    pub moderator_roles: Vec<u64>,
}

fn default_bypass_users() -> Vec<u64> {
    DEFAULT_BYPASS_USERS.to_vec()
}

fn default_moderator_roles() -> Vec<u64> {
    DEFAULT_MODERATOR_ROLES.to_vec()
}

impl Default for ModeratorPolicy {
    fn default() -> Self {
        Self {
            bypass_users: default_bypass_users(),
            moderator_roles: default_moderator_roles(),
        }
    }
}

impl ModeratorPolicy {
    /// Check if a user is a bypass user
    pub fn is_bypass(&self, user_id: u64) -> bool {
        self.bypass_users.contains(&user_id)
    }

    /// Check if any of the given roles is a moderator role
    pub fn is_moderator(&self, role_ids: &[u64]) -> bool {
        role_ids.iter().any(|r| self.moderator_roles.contains(r))
    }

    /// A user may act on a thread if they are a bypass user, the thread's
    /// owner, or a moderator.
    pub fn can_close(&self, user_id: u64, thread_owner: Option<u64>, role_ids: &[u64]) -> bool {
        self.is_bypass(user_id) || thread_owner == Some(user_id) || self.is_moderator(role_ids)
    }
}
