//! Host-side doubles for the hardware traits

use std::vec::Vec;

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};

use crate::motion::{DriverConfig, StepperDriver};
use crate::traits::{AlarmTimer, PhaseOutput, StepperError};

/// Records every bundle write
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub writes: Vec<u8>,
}

impl RecordingOutput {
    pub fn last(&self) -> Option<u8> {
        self.writes.last().copied()
    }
}

impl PhaseOutput for RecordingOutput {
    fn write_phase(&mut self, code: u8) {
        self.writes.push(code & 0x0F);
    }
}

/// Alarm timer that only tracks what it was asked to do
#[derive(Debug, Default)]
pub struct FakeAlarm {
    pub enabled: bool,
    pub running: bool,
    pub period_us: Option<u32>,
    pub starts: u32,
    pub fail_enable: bool,
}

impl AlarmTimer for FakeAlarm {
    fn enable(&mut self) -> Result<(), StepperError> {
        if self.fail_enable {
            return Err(StepperError::TimerUnavailable);
        }
        self.enabled = true;
        Ok(())
    }

    fn start(&mut self, period_us: u32) {
        self.running = true;
        self.period_us = Some(period_us);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

pub type TestDriver = StepperDriver<NoopRawMutex, RecordingOutput, FakeAlarm>;

pub fn test_driver() -> TestDriver {
    StepperDriver::new(
        RecordingOutput::default(),
        FakeAlarm::default(),
        DriverConfig::default(),
    )
    .unwrap()
}

fn alarm_running<M: RawMutex>(driver: &StepperDriver<M, RecordingOutput, FakeAlarm>) -> bool {
    driver.inspect(|_, timer| timer.running)
}

/// Deliver alarms while the timer runs, returning how many fired
pub fn run_to_halt<M: RawMutex>(driver: &StepperDriver<M, RecordingOutput, FakeAlarm>) -> u32 {
    let mut alarms = 0;
    while alarm_running(driver) {
        driver.on_alarm();
        alarms += 1;
    }
    alarms
}

/// Cooperative stand-in for the alarm interrupt
///
/// Fires one alarm per poll while the timer runs, yielding in between so
/// the tasks under test can make progress.
pub async fn pump_alarms(driver: &TestDriver, rounds: usize) {
    for _ in 0..rounds {
        if alarm_running(driver) {
            driver.on_alarm();
        }
        embassy_futures::yield_now().await;
    }
}
