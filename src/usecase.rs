//! validated alarm operations
//!
//! each function wraps exactly one repository call: inputs are checked and
//! existence is verified before anything mutating runs, so a failed
//! precondition never touches the store.

use crate::{
    alarm::{Alarm, CreateAlarmRequest, UpdateAlarmRequest},
    error::AlarmError,
    store::AlarmStore,
};

const MAX_HOUR: u8 = 23;
const MAX_MINUTE: u8 = 59;

pub fn create_alarm(
    store: &AlarmStore,
    request: CreateAlarmRequest,
) -> Result<Alarm, AlarmError> {
    if request.hour > MAX_HOUR {
        return Err(AlarmError::InvalidHour);
    }
    if request.minute > MAX_MINUTE {
        return Err(AlarmError::InvalidMinute);
    }

    Ok(store.create(request)?)
}

pub fn update_alarm(
    store: &AlarmStore,
    request: UpdateAlarmRequest,
) -> Result<Alarm, AlarmError> {
    if request.hour.is_some_and(|hour| hour > MAX_HOUR) {
        return Err(AlarmError::InvalidHour);
    }
    if request.minute.is_some_and(|minute| minute > MAX_MINUTE) {
        return Err(AlarmError::InvalidMinute);
    }
    if store.get_by_id(&request.id).is_none() {
        return Err(AlarmError::NotFound);
    }

    Ok(store.update(request)?)
}

pub fn delete_alarm(store: &AlarmStore, id: &str) -> Result<(), AlarmError> {
    if store.get_by_id(id).is_none() {
        return Err(AlarmError::NotFound);
    }

    Ok(store.delete(id)?)
}

pub fn toggle_alarm(
    store: &AlarmStore,
    id: &str,
    enabled: bool,
) -> Result<Alarm, AlarmError> {
    if store.get_by_id(id).is_none() {
        return Err(AlarmError::NotFound);
    }

    Ok(store.toggle_enabled(id, enabled)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{KeyValue, MemoryStore};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    /// wraps a [`MemoryStore`] and counts writes, to prove which operations
    /// never reach the underlying store
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValue for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<bool, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.remove(key)
        }
    }

    fn counting_store() -> (Arc<CountingStore>, AlarmStore) {
        let kv = Arc::new(CountingStore::default());
        let store = AlarmStore::new(Arc::clone(&kv) as Arc<dyn KeyValue>);
        (kv, store)
    }

    #[test]
    fn create_rejects_out_of_range_times_without_persisting() {
        let (kv, store) = counting_store();

        let err = create_alarm(&store, CreateAlarmRequest::new("x", 24, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid hour. Must be between 0-23.");

        let err = create_alarm(&store, CreateAlarmRequest::new("x", 23, 60)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid minute. Must be between 0-59.");

        assert_eq!(kv.writes(), 0);
    }

    #[test]
    fn create_persists_a_valid_request() {
        let (kv, store) = counting_store();
        let alarm = create_alarm(&store, CreateAlarmRequest::new("Morning Alarm", 7, 30)).unwrap();

        assert!(alarm.enabled);
        assert_eq!(kv.writes(), 1);
        assert_eq!(store.get_by_id(&alarm.id).unwrap(), alarm);
    }

    #[test]
    fn update_validates_only_fields_that_are_present() {
        let (kv, store) = counting_store();
        let alarm = create_alarm(&store, CreateAlarmRequest::new("x", 7, 30)).unwrap();

        let mut bad_hour = UpdateAlarmRequest::new(&alarm.id);
        bad_hour.hour = Some(24);
        let err = update_alarm(&store, bad_hour).unwrap_err();
        assert_eq!(err.to_string(), "Invalid hour. Must be between 0-23.");

        let mut bad_minute = UpdateAlarmRequest::new(&alarm.id);
        bad_minute.minute = Some(60);
        let err = update_alarm(&store, bad_minute).unwrap_err();
        assert_eq!(err.to_string(), "Invalid minute. Must be between 0-59.");

        // only the create wrote
        assert_eq!(kv.writes(), 1);

        // a request with no time fields skips time validation entirely
        let mut relabel = UpdateAlarmRequest::new(&alarm.id);
        relabel.label = Some("renamed".to_string());
        assert_eq!(update_alarm(&store, relabel).unwrap().label, "renamed");
    }

    #[test]
    fn operations_on_missing_ids_never_write() {
        let (kv, store) = counting_store();

        let err = update_alarm(&store, UpdateAlarmRequest::new("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "Alarm not found");

        let err = delete_alarm(&store, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "Alarm not found");

        let err = toggle_alarm(&store, "ghost", true).unwrap_err();
        assert_eq!(err.to_string(), "Alarm not found");

        assert_eq!(kv.writes(), 0);
    }

    #[test]
    fn delete_succeeds_with_no_payload() {
        let (_, store) = counting_store();
        let alarm = create_alarm(&store, CreateAlarmRequest::new("x", 7, 30)).unwrap();

        delete_alarm(&store, &alarm.id).unwrap();
        assert!(store.get_by_id(&alarm.id).is_none());
    }

    #[test]
    fn toggle_flips_exactly_the_enabled_flag() {
        let (_, store) = counting_store();
        let alarm = create_alarm(&store, CreateAlarmRequest::new("x", 7, 30)).unwrap();

        let off = toggle_alarm(&store, &alarm.id, false).unwrap();
        assert!(!off.enabled);
        assert_eq!(off.hour, alarm.hour);

        let on = toggle_alarm(&store, &alarm.id, true).unwrap();
        assert!(on.enabled);
    }
}
