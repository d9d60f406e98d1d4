use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseRepeatDayError;

/// sound id resolved by the notification backend when an alarm carries none
pub const DEFAULT_SOUND_ID: &str = "default";
/// snooze length in minutes applied when a create request leaves it out
pub const DEFAULT_SNOOZE_DURATION: u32 = 5;

/// a persisted alarm
///
/// `id` and `created_at` are fixed when the store creates the record,
/// `updated_at` is refreshed on every mutation. the serialized field names
/// match the store layout written by earlier versions of the app, so an
/// existing alarm collection keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    pub label: String,
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
    pub repeat_days: BTreeSet<RepeatDay>,
    pub sound_id: String,
    pub vibrate: bool,
    pub snooze_enabled: bool,
    pub snooze_duration: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alarm {
    /// the wall clock time this alarm fires at
    ///
    /// `None` when the stored hour or minute is out of range, which can only
    /// happen with a hand-edited store.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
    }
}

/// weekday tags an alarm repeats on, empty set means fire once
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl RepeatDay {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for RepeatDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RepeatDay {
    type Err = ParseRepeatDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == s.to_lowercase())
            .ok_or_else(|| ParseRepeatDayError(s.to_string()))
    }
}

/// input for creating an alarm, `label`/`hour`/`minute` are required
///
/// every other field is optional, the store fills in the documented default
/// when a field is left out.
#[derive(Debug, Clone, Default)]
pub struct CreateAlarmRequest {
    pub label: String,
    pub hour: u8,
    pub minute: u8,
    pub repeat_days: Option<BTreeSet<RepeatDay>>,
    pub sound_id: Option<String>,
    pub vibrate: Option<bool>,
    pub snooze_enabled: Option<bool>,
    pub snooze_duration: Option<u32>,
}

impl CreateAlarmRequest {
    #[must_use]
    pub fn new(label: impl Into<String>, hour: u8, minute: u8) -> Self {
        Self {
            label: label.into(),
            hour,
            minute,
            ..Self::default()
        }
    }
}

/// input for editing an alarm, only `id` is required
///
/// a present field replaces the stored one, an absent field leaves it alone
#[derive(Debug, Clone, Default)]
pub struct UpdateAlarmRequest {
    pub id: String,
    pub label: Option<String>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub enabled: Option<bool>,
    pub repeat_days: Option<BTreeSet<RepeatDay>>,
    pub sound_id: Option<String>,
    pub vibrate: Option<bool>,
    pub snooze_enabled: Option<bool>,
    pub snooze_duration: Option<u32>,
}

impl UpdateAlarmRequest {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
