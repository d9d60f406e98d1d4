use std::{collections::BTreeSet, error::Error, sync::Arc};

use chrono::{NaiveTime, Timelike};
use clap::{command, Parser, Subcommand};
use clarion_clock::{
    config::Config,
    scheduler::format_time,
    AlarmScheduler, AlarmStore, AlarmViewModel, CreateAlarmRequest, FileStore, LogNotifier,
    RepeatDay, StateStore,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// write a fresh config file and register the notification channel
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm, time is 24 hour H:MM
    Add {
        label: String,
        time: String,
        /// weekday the alarm repeats on, may be given more than once
        #[clap(long)]
        repeat: Vec<String>,
        /// sound id the notification plays
        #[clap(long)]
        sound: Option<String>,
    },
    /// show every alarm
    List,
    /// remove an alarm by id
    Remove { id: String },
    /// enable an alarm (or disable it with --off)
    Toggle {
        id: String,
        #[clap(long)]
        off: bool,
    },
    /// re-register notifications for every enabled alarm, run after a reboot
    Reschedule,
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_file_logger::init_logger!("clarion_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    let config = if Config::is_config_present() {
        Config::load(&Config::config_path()?)?
    } else {
        Config::new()
    };

    let store = Arc::new(AlarmStore::new(Arc::new(FileStore::new(
        config.data_path()?,
    ))));
    let state = Arc::new(StateStore::new());
    let scheduler = AlarmScheduler::new(Arc::clone(&store), Arc::new(LogNotifier));
    let view_model = AlarmViewModel::new(
        Arc::clone(&store),
        scheduler.clone(),
        Arc::clone(&state),
    );

    match args.command {
        Command::Init { force } => {
            if force || !Config::is_config_present() {
                let path = Config::config_path()?;
                Config::new().save(&path)?;
                println!("wrote config to {}", path.display());
            }
            scheduler.initialize(&config.channel_name)?;
            if !scheduler.request_permission()? {
                log::warn!("notification permission denied, alarms will not ring");
            }
        }
        Command::Add {
            label,
            time,
            repeat,
            sound,
        } => {
            let (hour, minute) = parse_time(&time)?;
            let repeat_days = repeat
                .iter()
                .map(|day| day.parse())
                .collect::<Result<BTreeSet<RepeatDay>, _>>()?;

            let mut request = CreateAlarmRequest::new(label, hour, minute);
            request.repeat_days = (!repeat_days.is_empty()).then_some(repeat_days);
            request.sound_id = sound;

            if !view_model.create_alarm(request) {
                return Err(published_error(&state).into());
            }
            // the projection only holds what this run created, newest last
            if let Some(alarm) = state.snapshot().alarms.last() {
                println!("added alarm {}", alarm.id);
            }
        }
        Command::List => {
            view_model.load_alarms();
            let snapshot = state.snapshot();
            if snapshot.alarms.is_empty() {
                println!("no alarms");
            }
            for alarm in snapshot.alarms {
                let time = alarm.time().map_or_else(
                    || format_time(alarm.hour, alarm.minute),
                    |t| t.format(&config.time_format).to_string(),
                );
                let days: Vec<&str> = alarm.repeat_days.iter().map(|day| day.as_str()).collect();
                println!(
                    "{}  {}  [{}]  {}{}",
                    alarm.id,
                    time.trim(),
                    if alarm.enabled { "on" } else { "off" },
                    alarm.label,
                    if days.is_empty() {
                        String::new()
                    } else {
                        format!("  ({})", days.join(", "))
                    }
                );
            }
        }
        Command::Remove { id } => {
            if !view_model.delete_alarm(&id) {
                return Err(published_error(&state).into());
            }
            println!("removed alarm {id}");
        }
        Command::Toggle { id, off } => {
            if !view_model.toggle_alarm(&id, !off) {
                return Err(published_error(&state).into());
            }
            println!(
                "alarm {id} is now {}",
                if off { "disabled" } else { "enabled" }
            );
        }
        Command::Reschedule => {
            let count = scheduler.reschedule_all()?;
            println!("rescheduled {count} alarms");
        }
    }
    Ok(())
}

fn parse_time(time: &str) -> Result<(u8, u8), Box<dyn Error>> {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")?;
    Ok((parsed.hour() as u8, parsed.minute() as u8))
}

fn published_error(state: &StateStore) -> String {
    state
        .snapshot()
        .error
        .unwrap_or_else(|| "unknown error".to_string())
}
