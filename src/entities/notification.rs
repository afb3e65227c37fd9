// 🔔 Notification - read-only feed entries owned by a user

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Appointment,
    Payment,
    Reminder,
    System,
}

impl NotificationType {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Appointment => "📅",
            NotificationType::Payment => "💰",
            NotificationType::Reminder => "🔔",
            NotificationType::System => "⚙️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub date: NaiveDate,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Identified for Notification {
    const KIND: &'static str = "Notification";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Notifications addressed to `user_id`, in feed order
pub fn for_user<'a>(notifications: &'a [Notification], user_id: &str) -> Vec<&'a Notification> {
    notifications.iter().filter(|n| n.user_id == user_id).collect()
}

pub fn unread_count(notifications: &[Notification], user_id: &str) -> usize {
    notifications
        .iter()
        .filter(|n| n.user_id == user_id && !n.read)
        .count()
}
