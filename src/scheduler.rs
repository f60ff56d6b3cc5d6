use crate::ports;
use crate::types::{REFERENCE_OFFSET, Slot};

use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub enum ScheduleError {
    DuplicateSlot { session: &'static str, zone: &'static str },
    InvalidTime { hour: u8, minute: u8 },
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::DuplicateSlot { session, zone } => {
                write!(f, "duplicate slot for {session} in {zone}")
            }
            ScheduleError::InvalidTime { hour, minute } => {
                write!(f, "invalid trigger time {hour:02}:{minute:02}")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

enum SchedulerState {
    Stopped,
    Running(JoinHandle<()>),
}

/// Timezone-aware recurring-task runner. All triggers are evaluated
/// against the reference-zone wall clock once per minute; each matching
/// slot fires the runner as its own task, so one firing's network call
/// cannot stall the tick loop or a sibling firing.
pub struct CronScheduler<T, J> {
    time: T,
    runner: J,
    slots: Vec<Slot>,
    state: SchedulerState,
}

impl<T, J> CronScheduler<T, J>
where
    T: ports::TimeProvider,
    J: ports::BroadcastRunner,
{
    pub fn new(time: T, runner: J) -> Self {
        Self {
            time,
            runner,
            slots: Vec::new(),
            state: SchedulerState::Stopped,
        }
    }

    /// Registers the trigger table. A duplicate (session, zone) pair or an
    /// out-of-range time is a programming error and fails fast.
    pub fn configure(&mut self, slots: Vec<Slot>) -> Result<(), ScheduleError> {
        for (index, slot) in slots.iter().enumerate() {
            if slot.hour > 23 || slot.minute > 59 {
                return Err(ScheduleError::InvalidTime {
                    hour: slot.hour,
                    minute: slot.minute,
                });
            }
            let duplicate = slots[..index]
                .iter()
                .any(|other| other.session == slot.session && other.zone == slot.zone);
            if duplicate {
                return Err(ScheduleError::DuplicateSlot {
                    session: slot.session.label(),
                    zone: slot.zone.tag(),
                });
            }
        }
        self.slots = slots;
        Ok(())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }

    /// Stopped -> Running. Spawns the tick loop; a second call while
    /// running is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let time = self.time.clone();
        let runner = self.runner.clone();
        let slots = self.slots.clone();
        let handle = tokio::spawn(async move {
            tick_loop(time, runner, slots).await;
        });
        self.state = SchedulerState::Running(handle);
    }

    /// Running -> Stopped. No trigger fires after this returns; firings
    /// already spawned are left to complete.
    pub fn stop(&mut self) {
        if let SchedulerState::Running(handle) =
            std::mem::replace(&mut self.state, SchedulerState::Stopped)
        {
            handle.abort();
        }
    }
}

async fn tick_loop<T, J>(time: T, runner: J, slots: Vec<Slot>)
where
    T: ports::TimeProvider,
    J: ports::BroadcastRunner,
{
    let mut last_fired_minute = None;
    loop {
        let now = time.now().to_offset(REFERENCE_OFFSET);
        let minute = (now.hour(), now.minute());
        if last_fired_minute != Some(minute) {
            last_fired_minute = Some(minute);
            for slot in &slots {
                if slot.hour == now.hour() && slot.minute == now.minute() {
                    let runner = runner.clone();
                    let session = slot.session;
                    let zone = slot.zone;
                    tokio::spawn(async move {
                        runner.run(session.label(), zone.tag()).await;
                    });
                }
            }
        }
        time.sleep(until_next_minute(now.second())).await;
    }
}

fn until_next_minute(second: u8) -> Duration {
    Duration::from_secs(u64::from(60 - second.min(59)))
}
