//! turns alarm records into scheduled device notifications
//!
//! the invariant kept here: exactly one outstanding notification per enabled
//! alarm, none for a disabled or deleted one. notification identity is the
//! alarm id, so re-scheduling replaces instead of stacking.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    alarm::{Alarm, DEFAULT_SOUND_ID},
    error::NotifyError,
    notify::{
        ChannelConfig, Importance, NotificationContent, Notifier, RepeatFrequency, Trigger,
        VIBRATION_PATTERN,
    },
    store::AlarmStore,
    time::{Clock, SystemClock},
};

/// channel every alarm notification is posted on
pub const CHANNEL_ID: &str = "alarm-channel";

#[derive(Clone)]
pub struct AlarmScheduler {
    store: Arc<AlarmStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AlarmScheduler {
    #[must_use]
    pub fn new(store: Arc<AlarmStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_clock(store, notifier, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        store: Arc<AlarmStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// registers the alarm notification channel, call once at startup
    pub fn initialize(&self, channel_name: &str) -> Result<(), NotifyError> {
        self.notifier.create_channel(&ChannelConfig {
            id: CHANNEL_ID.to_string(),
            name: channel_name.to_string(),
            importance: Importance::High,
            sound: DEFAULT_SOUND_ID.to_string(),
            vibration: true,
        })
    }

    pub fn request_permission(&self) -> Result<bool, NotifyError> {
        self.notifier.request_permission()
    }

    /// registers the next firing of `alarm`, replacing any prior one
    ///
    /// a disabled alarm is cancelled instead, even when asked to schedule
    pub fn schedule_alarm(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        if !alarm.enabled {
            return self.cancel_alarm(&alarm.id);
        }

        let trigger = next_trigger(alarm, self.clock.now_local()).ok_or_else(|| {
            NotifyError::new(format!("alarm {} has an out-of-range time", alarm.id))
        })?;

        let content = NotificationContent {
            title: if alarm.label.is_empty() {
                "Alarm".to_string()
            } else {
                alarm.label.clone()
            },
            body: format_time(alarm.hour, alarm.minute),
            channel_id: CHANNEL_ID.to_string(),
            sound_id: alarm.sound_id.clone(),
            vibration_pattern: alarm.vibrate.then(|| VIBRATION_PATTERN.to_vec()),
        };

        log::debug!("scheduling alarm {} for {}", alarm.id, trigger.at);
        self.notifier.schedule_trigger(&alarm.id, &content, &trigger)
    }

    /// drops whatever notification is keyed by `id`, if any
    pub fn cancel_alarm(&self, id: &str) -> Result<(), NotifyError> {
        self.notifier.cancel(id)
    }

    /// re-registers every enabled alarm and returns how many were scheduled
    ///
    /// the platform notification registry does not reliably survive a process
    /// restart, so the host runs this on boot.
    pub fn reschedule_all(&self) -> Result<usize, NotifyError> {
        let mut scheduled = 0;
        for alarm in self.store.get_all() {
            if alarm.enabled {
                self.schedule_alarm(&alarm)?;
                scheduled += 1;
            }
        }
        log::info!("rescheduled {scheduled} alarms");
        Ok(scheduled)
    }
}

/// next firing of `alarm` relative to `now`: today at its wall clock time, or
/// tomorrow once that instant is no longer strictly in the future
///
/// any non-empty repeat set registers a plain daily repeat.
// TODO: register one trigger per selected weekday instead of a blanket daily
// repeat, right now a monday-only alarm re-fires every day
fn next_trigger(alarm: &Alarm, now: NaiveDateTime) -> Option<Trigger> {
    let mut at = now.date().and_time(alarm.time()?);
    if at <= now {
        at += chrono::Duration::days(1);
    }

    let repeat = (!alarm.repeat_days.is_empty()).then_some(RepeatFrequency::Daily);
    Some(Trigger { at, repeat })
}

/// 12 hour `H:MM AM/PM` rendering used as the notification body
#[must_use]
pub fn format_time(hour: u8, minute: u8) -> String {
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let period = if hour < 12 { "AM" } else { "PM" };
    format!("{display_hour}:{minute:02} {period}")
}
