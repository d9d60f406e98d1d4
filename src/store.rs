//! durable alarm storage: a small key-value abstraction plus the alarm
//! repository that owns the canonical collection
//!
//! every mutating repository operation is a full read-modify-write of one
//! serialized collection under one key. there is no concurrency token, so
//! overlapping mutations can lose updates; callers keep at most one mutating
//! operation in flight per collection.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::Rng;

use crate::{
    alarm::{Alarm, CreateAlarmRequest, UpdateAlarmRequest, DEFAULT_SNOOZE_DURATION, DEFAULT_SOUND_ID},
    error::StoreError,
    time::{Clock, SystemClock},
};

/// the single key the whole alarm collection lives under
pub const STORAGE_KEY: &str = "clarion-clock:alarms";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// durable string-to-string storage
///
/// implementations must persist values across process restarts, except for
/// [`MemoryStore`] which trades durability for test convenience.
pub trait KeyValue: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// returns whether the key existed
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// file backed key-value store, one file per key under a root directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // keys use a `namespace:name` convention, keep file names plain
        self.root.join(format!("{}.json", key.replace([':', '/'], "_")))
    }
}

impl KeyValue for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// in-memory key-value store for tests and ephemeral use
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries().remove(key).is_some())
    }
}

/// the alarm repository, single source of truth for the alarm collection
///
/// reads degrade to an empty collection on any underlying failure (the app's
/// degraded mode is "no alarms", not a crash); writes propagate their errors.
pub struct AlarmStore {
    kv: Arc<dyn KeyValue>,
    clock: Arc<dyn Clock>,
}

impl AlarmStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self::with_clock(kv, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(kv: Arc<dyn KeyValue>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    /// every alarm, in insertion order
    #[must_use]
    pub fn get_all(&self) -> Vec<Alarm> {
        match self.read_all() {
            Ok(alarms) => alarms,
            Err(err) => {
                log::error!("failed to read alarms, treating store as empty: {err}");
                Vec::new()
            }
        }
    }

    /// linear scan, fine for the handful of alarms a person keeps
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Alarm> {
        self.get_all().into_iter().find(|alarm| alarm.id == id)
    }

    /// appends a new alarm with a fresh id, timestamps and the documented
    /// defaults for whatever the request left out
    pub fn create(&self, request: CreateAlarmRequest) -> Result<Alarm, StoreError> {
        let mut alarms = self.get_all();
        let now = self.clock.now_utc();

        let alarm = Alarm {
            id: self.generate_id(),
            label: request.label,
            hour: request.hour,
            minute: request.minute,
            enabled: true,
            repeat_days: request.repeat_days.unwrap_or_default(),
            sound_id: request
                .sound_id
                .unwrap_or_else(|| DEFAULT_SOUND_ID.to_string()),
            vibrate: request.vibrate.unwrap_or(true),
            snooze_enabled: request.snooze_enabled.unwrap_or(true),
            snooze_duration: request.snooze_duration.unwrap_or(DEFAULT_SNOOZE_DURATION),
            created_at: now,
            updated_at: now,
        };

        alarms.push(alarm.clone());
        self.save_all(&alarms)?;
        Ok(alarm)
    }

    /// merges the request's present fields over the stored record and stamps
    /// a fresh `updated_at`
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no alarm has the requested id, this is
    /// the one read path in this layer that surfaces an error instead of
    /// swallowing it.
    pub fn update(&self, request: UpdateAlarmRequest) -> Result<Alarm, StoreError> {
        let mut alarms = self.get_all();
        let Some(alarm) = alarms.iter_mut().find(|alarm| alarm.id == request.id) else {
            return Err(StoreError::NotFound);
        };

        if let Some(label) = request.label {
            alarm.label = label;
        }
        if let Some(hour) = request.hour {
            alarm.hour = hour;
        }
        if let Some(minute) = request.minute {
            alarm.minute = minute;
        }
        if let Some(enabled) = request.enabled {
            alarm.enabled = enabled;
        }
        if let Some(repeat_days) = request.repeat_days {
            alarm.repeat_days = repeat_days;
        }
        if let Some(sound_id) = request.sound_id {
            alarm.sound_id = sound_id;
        }
        if let Some(vibrate) = request.vibrate {
            alarm.vibrate = vibrate;
        }
        if let Some(snooze_enabled) = request.snooze_enabled {
            alarm.snooze_enabled = snooze_enabled;
        }
        if let Some(snooze_duration) = request.snooze_duration {
            alarm.snooze_duration = snooze_duration;
        }
        alarm.updated_at = self.clock.now_utc();

        let updated = alarm.clone();
        self.save_all(&alarms)?;
        Ok(updated)
    }

    /// removes the matching record, a missing id is a no-op rather than an
    /// error
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut alarms = self.get_all();
        alarms.retain(|alarm| alarm.id != id);
        self.save_all(&alarms)
    }

    pub fn toggle_enabled(&self, id: &str, enabled: bool) -> Result<Alarm, StoreError> {
        let mut request = UpdateAlarmRequest::new(id);
        request.enabled = Some(enabled);
        self.update(request)
    }

    fn read_all(&self) -> Result<Vec<Alarm>, StoreError> {
        match self.kv.get(STORAGE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, alarms: &[Alarm]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(alarms)?;
        self.kv.set(STORAGE_KEY, &raw)
    }

    /// collision resistant within one app lifetime, not globally unique
    fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("alarm_{}_{suffix}", self.clock.now_utc().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::RepeatDay;
    use crate::time::FixedClock;
    use chrono::NaiveDateTime;

    fn fixed_clock(at: &str) -> Arc<FixedClock> {
        Arc::new(FixedClock::new(at.parse::<NaiveDateTime>().unwrap()))
    }

    fn store() -> AlarmStore {
        AlarmStore::with_clock(
            Arc::new(MemoryStore::new()),
            fixed_clock("2024-01-15T08:00:00"),
        )
    }

    #[test]
    fn memory_store_round_trips_values() {
        let kv = MemoryStore::new();
        assert_eq!(kv.get("missing").unwrap(), None);

        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));

        assert!(kv.remove("k").unwrap());
        assert!(!kv.remove("k").unwrap());
        assert_eq!(kv.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileStore::new(dir.path());

        assert_eq!(kv.get(STORAGE_KEY).unwrap(), None);
        kv.set(STORAGE_KEY, "[]").unwrap();
        assert_eq!(kv.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
        assert!(kv.remove(STORAGE_KEY).unwrap());
        assert_eq!(kv.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn create_applies_defaults_only_to_omitted_fields() {
        let store = store();
        let mut request = CreateAlarmRequest::new("Wake", 6, 45);
        request.snooze_duration = Some(0);

        let alarm = store.create(request).unwrap();

        assert!(alarm.enabled);
        assert!(alarm.repeat_days.is_empty());
        assert_eq!(alarm.sound_id, DEFAULT_SOUND_ID);
        assert!(alarm.vibrate);
        assert!(alarm.snooze_enabled);
        // an explicit zero is kept, defaults only fill omissions
        assert_eq!(alarm.snooze_duration, 0);
        assert_eq!(alarm.created_at, alarm.updated_at);
    }

    #[test]
    fn sequential_creates_never_share_an_id() {
        let store = store();
        let first = store.create(CreateAlarmRequest::new("a", 1, 0)).unwrap();
        let second = store.create(CreateAlarmRequest::new("b", 2, 0)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn collections_round_trip_for_zero_one_and_many() {
        for n in [0_u8, 1, 7] {
            let store = store();
            let mut created = Vec::new();
            for i in 0..n {
                created.push(
                    store
                        .create(CreateAlarmRequest::new(format!("alarm {i}"), i, i))
                        .unwrap(),
                );
            }
            assert_eq!(store.get_all(), created);
        }
    }

    #[test]
    fn update_merges_present_fields_and_restamps() {
        let kv: Arc<dyn KeyValue> = Arc::new(MemoryStore::new());
        let created = AlarmStore::with_clock(Arc::clone(&kv), fixed_clock("2024-01-15T08:00:00"))
            .create(CreateAlarmRequest::new("Morning Alarm", 7, 30))
            .unwrap();

        let later = AlarmStore::with_clock(Arc::clone(&kv), fixed_clock("2024-01-16T09:00:00"));
        let mut request = UpdateAlarmRequest::new(&created.id);
        request.minute = Some(45);
        request.repeat_days = Some([RepeatDay::Monday].into());
        let updated = later.update(request).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.label, "Morning Alarm");
        assert_eq!(updated.hour, 7);
        assert_eq!(updated.minute, 45);
        assert_eq!(updated.repeat_days, std::collections::BTreeSet::from([RepeatDay::Monday]));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(later.get_by_id(&created.id).unwrap(), updated);
    }

    #[test]
    fn update_of_a_missing_id_is_not_found() {
        let store = store();
        let err = store.update(UpdateAlarmRequest::new("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn delete_removes_exactly_the_matching_record() {
        let store = store();
        let keep = store.create(CreateAlarmRequest::new("keep", 6, 0)).unwrap();
        let gone = store.create(CreateAlarmRequest::new("gone", 7, 0)).unwrap();

        store.delete(&gone.id).unwrap();
        assert_eq!(store.get_all(), vec![keep.clone()]);

        // deleting a missing id leaves the collection alone and is no error
        store.delete("nope").unwrap();
        assert_eq!(store.get_all(), vec![keep]);
    }

    #[test]
    fn toggle_enabled_is_an_update() {
        let store = store();
        let alarm = store.create(CreateAlarmRequest::new("nap", 14, 0)).unwrap();

        let toggled = store.toggle_enabled(&alarm.id, false).unwrap();
        assert!(!toggled.enabled);
        assert!(!store.get_by_id(&alarm.id).unwrap().enabled);
    }

    #[test]
    fn a_corrupt_blob_reads_as_an_empty_collection() {
        let kv: Arc<dyn KeyValue> = Arc::new(MemoryStore::new());
        kv.set(STORAGE_KEY, "this is not json").unwrap();

        let store = AlarmStore::new(Arc::clone(&kv));
        assert!(store.get_all().is_empty());
        assert!(store.get_by_id("anything").is_none());
    }

    #[test]
    fn generated_ids_follow_the_store_format() {
        let store = store();
        let alarm = store.create(CreateAlarmRequest::new("x", 0, 0)).unwrap();

        let mut parts = alarm.id.splitn(3, '_');
        assert_eq!(parts.next(), Some("alarm"));
        let millis: i64 = parts.next().unwrap().parse().unwrap();
        assert_eq!(
            millis,
            "2024-01-15T08:00:00"
                .parse::<NaiveDateTime>()
                .unwrap()
                .and_utc()
                .timestamp_millis()
        );
        assert_eq!(parts.next().unwrap().len(), ID_SUFFIX_LEN);
    }
}
