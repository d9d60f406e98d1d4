//! sequences use cases, the observer projection and the scheduler
//!
//! every operation follows the same shape: raise the loading flag, clear the
//! previous error, run the use case, apply the result to the projection and
//! the scheduler, publish the failure message otherwise, and always drop the
//! loading flag at the end. mutating operations must not overlap, the
//! repository's read-modify-write persistence is not safe under concurrent
//! writers.

use std::sync::Arc;

use crate::{
    alarm::{CreateAlarmRequest, UpdateAlarmRequest},
    scheduler::AlarmScheduler,
    state::StateStore,
    store::AlarmStore,
    usecase,
};

pub struct AlarmViewModel {
    store: Arc<AlarmStore>,
    scheduler: AlarmScheduler,
    state: Arc<StateStore>,
}

impl AlarmViewModel {
    #[must_use]
    pub fn new(store: Arc<AlarmStore>, scheduler: AlarmScheduler, state: Arc<StateStore>) -> Self {
        Self {
            store,
            scheduler,
            state,
        }
    }

    /// refreshes the projection from the repository
    pub fn load_alarms(&self) {
        self.state.set_loading(true);
        self.state.set_error(None);
        self.state.set_alarms(self.store.get_all());
        self.state.set_loading(false);
    }

    pub fn create_alarm(&self, request: CreateAlarmRequest) -> bool {
        self.begin();
        let outcome = usecase::create_alarm(&self.store, request)
            .map_err(|err| err.to_string())
            .and_then(|alarm| {
                self.state.add_alarm(alarm.clone());
                self.scheduler
                    .schedule_alarm(&alarm)
                    .map_err(|err| err.to_string())
            });
        self.finish(outcome)
    }

    pub fn update_alarm(&self, request: UpdateAlarmRequest) -> bool {
        self.begin();
        let outcome = usecase::update_alarm(&self.store, request)
            .map_err(|err| err.to_string())
            .and_then(|alarm| {
                self.state.update_alarm(alarm.clone());
                self.scheduler
                    .schedule_alarm(&alarm)
                    .map_err(|err| err.to_string())
            });
        self.finish(outcome)
    }

    pub fn delete_alarm(&self, id: &str) -> bool {
        self.begin();
        let outcome = usecase::delete_alarm(&self.store, id)
            .map_err(|err| err.to_string())
            .and_then(|()| {
                self.state.remove_alarm(id);
                self.scheduler.cancel_alarm(id).map_err(|err| err.to_string())
            });
        self.finish(outcome)
    }

    /// the scheduler call branches on the requested flag, not on whatever
    /// the stored record reads back
    pub fn toggle_alarm(&self, id: &str, enabled: bool) -> bool {
        self.begin();
        let outcome = usecase::toggle_alarm(&self.store, id, enabled)
            .map_err(|err| err.to_string())
            .and_then(|alarm| {
                self.state.set_enabled(id, enabled);
                if enabled {
                    self.scheduler.schedule_alarm(&alarm)
                } else {
                    self.scheduler.cancel_alarm(id)
                }
                .map_err(|err| err.to_string())
            });
        self.finish(outcome)
    }

    fn begin(&self) {
        self.state.set_loading(true);
        self.state.set_error(None);
    }

    fn finish(&self, outcome: Result<(), String>) -> bool {
        let ok = match outcome {
            Ok(()) => true,
            Err(message) => {
                self.state.set_error(Some(message));
                false
            }
        };
        self.state.set_loading(false);
        ok
    }
}
