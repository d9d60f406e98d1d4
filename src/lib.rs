#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

pub mod alarm;
pub mod config;
pub mod error;
/// the abstract notification backend and its stock implementations
pub mod notify;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod time;
/// validated alarm operations with uniform error reporting
pub mod usecase;
pub mod view_model;

pub use alarm::{Alarm, CreateAlarmRequest, RepeatDay, UpdateAlarmRequest};
pub use error::{AlarmError, ConfigError, NotifyError, StoreError};
pub use notify::{LogNotifier, Notifier};
pub use scheduler::AlarmScheduler;
pub use state::{AlarmListState, StateStore};
pub use store::{AlarmStore, FileStore, KeyValue, MemoryStore};
pub use view_model::AlarmViewModel;
