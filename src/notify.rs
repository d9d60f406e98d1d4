//! the abstract device-notification capability the scheduler drives
//!
//! the real backend (a platform notification API) lives outside this crate;
//! here is the trait it plugs into plus a log-backed default and a recording
//! double for tests.

use chrono::NaiveDateTime;

use crate::error::NotifyError;

/// vibration pattern attached to alarms with `vibrate` on
pub const VIBRATION_PATTERN: [u64; 2] = [300, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    Default,
    High,
}

/// notification channel definition, registered once at app startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub sound: String,
    pub vibration: bool,
}

/// what the notification shows and sounds like when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub sound_id: String,
    /// `None` disables vibration entirely
    pub vibration_pattern: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatFrequency {
    Daily,
}

/// when the notification fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// wall clock instant of the next firing
    pub at: NaiveDateTime,
    pub repeat: Option<RepeatFrequency>,
}

/// device notification backend
///
/// scheduling under an id that already has a live notification replaces it,
/// which is what keeps one alarm to at most one outstanding notification.
pub trait Notifier: Send + Sync {
    fn create_channel(&self, channel: &ChannelConfig) -> Result<(), NotifyError>;

    fn schedule_trigger(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<(), NotifyError>;

    /// cancelling an id with no live notification is a no-op
    fn cancel(&self, id: &str) -> Result<(), NotifyError>;

    fn request_permission(&self) -> Result<bool, NotifyError>;
}

/// backend that only reports through the log, used by the CLI and anywhere a
/// real device backend is not wired up
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn create_channel(&self, channel: &ChannelConfig) -> Result<(), NotifyError> {
        log::info!("registered notification channel {} ({})", channel.id, channel.name);
        Ok(())
    }

    fn schedule_trigger(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<(), NotifyError> {
        log::info!(
            "scheduled notification {id}: \"{}\" at {}{}",
            content.title,
            trigger.at,
            if trigger.repeat.is_some() { ", repeating daily" } else { "" }
        );
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), NotifyError> {
        log::info!("cancelled notification {id}");
        Ok(())
    }

    fn request_permission(&self) -> Result<bool, NotifyError> {
        Ok(true)
    }
}

/// notifier double that records every call, for tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: std::sync::Mutex<Vec<NotifierCall>>,
}

/// one recorded [`Notifier`] invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    CreateChannel(ChannelConfig),
    Schedule {
        id: String,
        content: NotificationContent,
        trigger: Trigger,
    },
    Cancel(String),
    RequestPermission,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// snapshot of every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: NotifierCall) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }
}

impl Notifier for RecordingNotifier {
    fn create_channel(&self, channel: &ChannelConfig) -> Result<(), NotifyError> {
        self.record(NotifierCall::CreateChannel(channel.clone()));
        Ok(())
    }

    fn schedule_trigger(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<(), NotifyError> {
        self.record(NotifierCall::Schedule {
            id: id.to_string(),
            content: content.clone(),
            trigger: *trigger,
        });
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), NotifyError> {
        self.record(NotifierCall::Cancel(id.to_string()));
        Ok(())
    }

    fn request_permission(&self) -> Result<bool, NotifyError> {
        self.record(NotifierCall::RequestPermission);
        Ok(true)
    }
}
