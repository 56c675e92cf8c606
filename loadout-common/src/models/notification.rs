// File: loadout-common/src/models/notification.rs

use serde::{Deserialize, Serialize};

/// Where an announcement ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Chat,
    Overhead,
    None,
}

impl Default for NotificationKind {
    fn default() -> Self {
        NotificationKind::None
    }
}

/// When an announcement fires relative to its product's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTiming {
    Start,
    End,
    Now,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        NotificationTiming::Start
    }
}

/// One announcement definition inside an EBS effect. A missing message means
/// the default thank-you line is composed from the transaction at send time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbsNotification {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_type: NotificationKind,
    #[serde(default)]
    pub timing_type: NotificationTiming,
}
