//! Step alarm
//!
//! The periodic step alarm is an `embassy-time` [`Ticker`] inside
//! [`run_alarm`]. The firmware runs that future on a high-priority
//! interrupt executor, so each tick preempts every thread-mode task, which
//! makes it the alarm interrupt context for the stepper driver.
//!
//! [`TickerAlarm`] is the driver's [`AlarmTimer`]. It does not touch the
//! ticker itself; it posts [`AlarmControl`] requests that `run_alarm`
//! applies. Only the latest request counts.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker, TICK_HZ};

use clockhand_core::motion::{AlarmAction, StepperDriver};
use clockhand_core::traits::{AlarmTimer, PhaseOutput, StepperError};

/// Request for the alarm task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmControl {
    /// (Re)start with a fresh period
    Start { period_us: u32 },
    /// Stop alarming
    Stop,
}

/// Control channel between [`TickerAlarm`] and [`run_alarm`]
pub type AlarmSignal = Signal<CriticalSectionRawMutex, AlarmControl>;

/// [`AlarmTimer`] backed by the alarm task
pub struct TickerAlarm {
    control: &'static AlarmSignal,
}

impl TickerAlarm {
    pub fn new(control: &'static AlarmSignal) -> Self {
        Self { control }
    }
}

impl AlarmTimer for TickerAlarm {
    fn enable(&mut self) -> Result<(), StepperError> {
        if TICK_HZ < 1_000_000 {
            return Err(StepperError::TimerResolution);
        }
        Ok(())
    }

    fn start(&mut self, period_us: u32) {
        self.control.signal(AlarmControl::Start { period_us });
    }

    fn stop(&mut self) {
        self.control.signal(AlarmControl::Stop);
    }
}

fn ticker(period_us: u32) -> Ticker {
    Ticker::every(Duration::from_micros(u64::from(period_us)))
}

/// Alarm loop
///
/// Calls [`StepperDriver::on_alarm`] every period while started. A
/// [`AlarmAction::Halt`] from the driver stops the ticker right away,
/// without waiting for the driver's own stop request to arrive.
pub async fn run_alarm<M, O, T>(control: &AlarmSignal, driver: &StepperDriver<M, O, T>) -> !
where
    M: RawMutex,
    O: PhaseOutput,
    T: AlarmTimer,
{
    let mut active: Option<Ticker> = None;
    loop {
        active = match active.take() {
            None => match control.wait().await {
                AlarmControl::Start { period_us } => Some(ticker(period_us)),
                AlarmControl::Stop => None,
            },
            Some(mut running) => {
                let event = select(running.next(), control.wait()).await;
                match event {
                    Either::First(()) => match driver.on_alarm() {
                        AlarmAction::Continue => Some(running),
                        AlarmAction::Halt => None,
                    },
                    Either::Second(AlarmControl::Start { period_us }) => Some(ticker(period_us)),
                    Either::Second(AlarmControl::Stop) => None,
                }
            }
        };
    }
}
