use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mizan_auth::User;

/// One audit-trail entry, appended on login and on invoice posting.
///
/// Kept in memory for the session; not part of the synced collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: mizan_core::UserId,
    pub user_name: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl ActivityLog {
    pub fn record(user: &User, action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user.id,
            user_name: user.name.clone(),
            action: action.into(),
            timestamp: Utc::now(),
            details: details.into(),
        }
    }
}
