//! the observer-facing alarm projection
//!
//! a read projection of the repository, owned by whoever constructs the view
//! model and handed in explicitly. observers get a full state snapshot over
//! an mpsc channel after every change; the projection never decides
//! persistence.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex, MutexGuard, PoisonError,
};

use crate::alarm::Alarm;

/// what the UI renders: the alarm list plus the in-flight and error flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmListState {
    pub alarms: Vec<Alarm>,
    pub loading: bool,
    pub error: Option<String>,
}

/// state container with a subscribe/publish contract
#[derive(Debug, Default)]
pub struct StateStore {
    state: Mutex<AlarmListState>,
    subscribers: Mutex<Vec<Sender<AlarmListState>>>,
}

impl StateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// the current state, cloned
    #[must_use]
    pub fn snapshot(&self) -> AlarmListState {
        self.lock_state().clone()
    }

    /// registers an observer; it receives a snapshot after every change
    /// until its receiver is dropped
    pub fn subscribe(&self) -> Receiver<AlarmListState> {
        let (tx, rx) = mpsc::channel();
        self.lock_subscribers().push(tx);
        rx
    }

    /// replaces the whole alarm list, used when reloading from the store
    pub fn set_alarms(&self, alarms: Vec<Alarm>) {
        self.mutate(move |state| state.alarms = alarms);
    }

    pub fn add_alarm(&self, alarm: Alarm) {
        self.mutate(move |state| state.alarms.push(alarm));
    }

    pub fn update_alarm(&self, alarm: Alarm) {
        self.mutate(move |state| {
            if let Some(slot) = state.alarms.iter_mut().find(|a| a.id == alarm.id) {
                *slot = alarm;
            }
        });
    }

    pub fn remove_alarm(&self, id: &str) {
        self.mutate(|state| state.alarms.retain(|alarm| alarm.id != id));
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        self.mutate(|state| {
            if let Some(alarm) = state.alarms.iter_mut().find(|alarm| alarm.id == id) {
                alarm.enabled = enabled;
            }
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(move |state| state.loading = loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.mutate(move |state| state.error = error);
    }

    fn mutate(&self, apply: impl FnOnce(&mut AlarmListState)) {
        let snapshot = {
            let mut state = self.lock_state();
            apply(&mut state);
            state.clone()
        };
        // disconnected observers are dropped on the way through
        self.lock_subscribers()
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }

    fn lock_state(&self) -> MutexGuard<'_, AlarmListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Sender<AlarmListState>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::DEFAULT_SOUND_ID;
    use chrono::Utc;

    fn alarm(id: &str) -> Alarm {
        let now = Utc::now();
        Alarm {
            id: id.to_string(),
            label: "x".to_string(),
            hour: 7,
            minute: 0,
            enabled: true,
            repeat_days: std::collections::BTreeSet::new(),
            sound_id: DEFAULT_SOUND_ID.to_string(),
            vibrate: true,
            snooze_enabled: true,
            snooze_duration: 5,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn every_mutation_reaches_every_subscriber() {
        let store = StateStore::new();
        let first = store.subscribe();
        let second = store.subscribe();

        store.add_alarm(alarm("a"));

        for rx in [&first, &second] {
            let state = rx.try_recv().unwrap();
            assert_eq!(state.alarms.len(), 1);
            assert_eq!(state.alarms[0].id, "a");
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let store = StateStore::new();
        let keep = store.subscribe();
        drop(store.subscribe());

        store.set_loading(true);
        assert!(keep.try_recv().unwrap().loading);

        store.set_loading(false);
        assert!(!keep.try_recv().unwrap().loading);
    }

    #[test]
    fn incremental_actions_track_the_collection() {
        let store = StateStore::new();
        store.set_alarms(vec![alarm("a"), alarm("b")]);

        let mut renamed = alarm("b");
        renamed.label = "renamed".to_string();
        store.update_alarm(renamed);
        store.set_enabled("a", false);
        store.remove_alarm("missing");

        let state = store.snapshot();
        assert_eq!(state.alarms.len(), 2);
        assert!(!state.alarms[0].enabled);
        assert_eq!(state.alarms[1].label, "renamed");

        store.remove_alarm("a");
        assert_eq!(store.snapshot().alarms.len(), 1);
    }

    #[test]
    fn updating_an_absent_alarm_changes_nothing() {
        let store = StateStore::new();
        store.set_alarms(vec![alarm("a")]);
        let before = store.snapshot();

        store.update_alarm(alarm("ghost"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn errors_are_published_and_clearable() {
        let store = StateStore::new();
        store.set_error(Some("Alarm not found".to_string()));
        assert_eq!(store.snapshot().error.as_deref(), Some("Alarm not found"));

        store.set_error(None);
        assert_eq!(store.snapshot().error, None);
    }
}
