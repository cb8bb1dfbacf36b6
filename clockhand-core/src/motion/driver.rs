//! Stepper driver
//!
//! Owns the output bundle, the alarm timer and the [`MotorMotion`] state.
//! Task-level calls (`arm`, `stop`, `position`, ...) and the alarm handler
//! ([`StepperDriver::on_alarm`]) all go through the same short critical
//! section, so neither side ever sees a torn update.
//!
//! The driver is built once and passed by reference to whoever needs it;
//! on target it lives in a `StaticCell` and is shared between the alarm
//! task and the motion executor.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use super::command::StepCommand;
use super::phase::PHASE_OFF;
use super::sequencer::{AlarmAction, MotorMotion};
use crate::traits::{AlarmTimer, Direction, PhaseOutput, StepperError};

/// Default floor for the step interval (10 kHz max step rate)
pub const DEFAULT_MIN_INTERVAL_US: u32 = 100;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Shortest step interval the actuator and lines can follow
    pub min_interval_us: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            min_interval_us: DEFAULT_MIN_INTERVAL_US,
        }
    }
}

/// How a motion ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionReport {
    /// Every commanded step was executed
    Completed { position: i64 },
    /// `stop()` ended the motion with steps left
    Interrupted { position: i64, remaining: u32 },
}

impl MotionReport {
    /// Absolute position when the motion ended
    pub fn position(&self) -> i64 {
        match self {
            Self::Completed { position } | Self::Interrupted { position, .. } => *position,
        }
    }

    /// True if all steps ran
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

struct Hardware<O, T> {
    motion: MotorMotion,
    output: O,
    timer: T,
    /// Alarm currently started by `arm`
    running: bool,
}

/// Driver for the single clock-hand stepper
pub struct StepperDriver<M: RawMutex, O, T> {
    hw: Mutex<M, RefCell<Hardware<O, T>>>,
    done: Signal<M, MotionReport>,
    config: DriverConfig,
}

impl<M: RawMutex, O: PhaseOutput, T: AlarmTimer> StepperDriver<M, O, T> {
    /// Take ownership of the hardware and bring it to a safe idle state
    ///
    /// Fails if the timer cannot be enabled or the configuration is
    /// unusable. There is no degraded mode without a timer.
    pub fn new(mut output: O, mut timer: T, config: DriverConfig) -> Result<Self, StepperError> {
        if config.min_interval_us == 0 {
            return Err(StepperError::InvalidConfig);
        }

        timer.enable()?;
        timer.stop();
        output.write_phase(PHASE_OFF);

        Ok(Self {
            hw: Mutex::new(RefCell::new(Hardware {
                motion: MotorMotion::new(),
                output,
                timer,
                running: false,
            })),
            done: Signal::new(),
            config,
        })
    }

    fn with_hw<R>(&self, f: impl FnOnce(&mut Hardware<O, T>) -> R) -> R {
        self.hw.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Driver configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Start a motion, replacing any motion in flight
    ///
    /// `interval_us` is clamped to [`DriverConfig::min_interval_us`]; the
    /// effective interval is returned. Position and phase carry over from
    /// the displaced motion; its remaining steps are dropped.
    pub fn arm(&self, steps: u32, direction: Direction, interval_us: u32) -> u32 {
        let interval_us = interval_us.max(self.config.min_interval_us);
        self.with_hw(|hw| {
            self.done.reset();
            hw.motion.retarget(steps, direction);
            hw.timer.start(interval_us);
            hw.running = true;
        });
        interval_us
    }

    /// Start a motion from a queued command
    pub fn arm_command(&self, cmd: &StepCommand) -> u32 {
        self.arm(cmd.steps, cmd.direction, cmd.interval_us)
    }

    /// Alarm handler
    ///
    /// Call from the alarm context on every period. Bounded: one bundle
    /// write plus counter updates, and on the final alarm a timer stop and
    /// the completion signal.
    pub fn on_alarm(&self) -> AlarmAction {
        self.with_hw(|hw| {
            let action = hw.motion.advance(&mut hw.output);
            if action == AlarmAction::Halt {
                hw.timer.stop();
                if hw.running {
                    hw.running = false;
                    self.done.signal(MotionReport::Completed {
                        position: hw.motion.absolute_position(),
                    });
                }
            }
            action
        })
    }

    /// Halt the timer and de-energize the coils
    ///
    /// Safe to call at any time, including while an alarm is due. Calling
    /// it while already stopped only re-asserts the idle outputs.
    pub fn stop(&self) {
        self.with_hw(|hw| {
            hw.timer.stop();
            hw.output.write_phase(PHASE_OFF);
            if !hw.running {
                return;
            }
            hw.running = false;
            let position = hw.motion.absolute_position();
            let remaining = hw.motion.halt();
            let report = if remaining > 0 {
                MotionReport::Interrupted {
                    position,
                    remaining,
                }
            } else {
                MotionReport::Completed { position }
            };
            self.done.signal(report);
        });
    }

    /// Absolute position in steps
    pub fn position(&self) -> i64 {
        self.with_hw(|hw| hw.motion.absolute_position())
    }

    /// Declare the current rotor position (e.g. a reference mark)
    ///
    /// Does not move the actuator.
    pub fn set_position(&self, value: i64) {
        self.with_hw(|hw| hw.motion.set_position(value));
    }

    /// True while the current command has steps left
    pub fn is_moving(&self) -> bool {
        self.with_hw(|hw| hw.motion.is_moving())
    }

    /// Snapshot of the motion state
    pub fn motion(&self) -> MotorMotion {
        self.with_hw(|hw| hw.motion)
    }

    /// Wait for the current motion to end
    ///
    /// Resolves once per motion. There is no timeout: a motion that never
    /// halts keeps the caller waiting.
    pub async fn wait_done(&self) -> MotionReport {
        self.done.wait().await
    }

    /// Take a pending completion report without waiting
    pub fn try_take_report(&self) -> Option<MotionReport> {
        self.done.try_take()
    }

    #[cfg(test)]
    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&O, &T) -> R) -> R {
        self.hw.lock(|cell| {
            let hw = cell.borrow();
            f(&hw.output, &hw.timer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::phase::PHASE_TABLE;
    use crate::testing::{run_to_halt, test_driver, FakeAlarm, RecordingOutput};
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    #[test]
    fn test_new_deenergizes_and_stops_timer() {
        let driver = test_driver();
        driver.inspect(|out, timer| {
            assert_eq!(out.writes.as_slice(), &[PHASE_OFF]);
            assert!(timer.enabled);
            assert!(!timer.running);
        });
        assert!(!driver.is_moving());
        assert_eq!(driver.position(), 0);
    }

    #[test]
    fn test_new_fails_without_timer() {
        let timer = FakeAlarm {
            fail_enable: true,
            ..Default::default()
        };
        let result: Result<StepperDriver<NoopRawMutex, _, _>, _> =
            StepperDriver::new(RecordingOutput::default(), timer, DriverConfig::default());
        assert_eq!(result.err(), Some(StepperError::TimerUnavailable));
    }

    #[test]
    fn test_new_rejects_zero_floor() {
        let result: Result<StepperDriver<NoopRawMutex, _, _>, _> = StepperDriver::new(
            RecordingOutput::default(),
            FakeAlarm::default(),
            DriverConfig { min_interval_us: 0 },
        );
        assert_eq!(result.err(), Some(StepperError::InvalidConfig));
    }

    #[test]
    fn test_arm_clamps_interval_to_floor() {
        let driver = test_driver();
        let effective = driver.arm(1024, Direction::Clockwise, 50);

        assert_eq!(effective, DEFAULT_MIN_INTERVAL_US);
        driver.inspect(|_, timer| {
            assert_eq!(timer.period_us, Some(DEFAULT_MIN_INTERVAL_US));
            assert!(timer.running);
        });
        assert!(driver.is_moving());
    }

    #[test]
    fn test_arm_keeps_slow_interval() {
        let driver = test_driver();
        assert_eq!(driver.arm(10, Direction::Clockwise, 2441), 2441);
        driver.inspect(|_, timer| assert_eq!(timer.period_us, Some(2441)));
    }

    #[test]
    fn test_motion_runs_to_completion() {
        let driver = test_driver();
        driver.arm(16, Direction::Clockwise, 1000);

        let alarms = run_to_halt(&driver);

        assert_eq!(alarms, 17);
        assert_eq!(driver.position(), 16);
        assert!(!driver.is_moving());
        assert_eq!(
            driver.try_take_report(),
            Some(MotionReport::Completed { position: 16 })
        );
        driver.inspect(|out, timer| {
            assert_eq!(out.last(), Some(PHASE_OFF));
            assert_eq!(&out.writes[1..9], &PHASE_TABLE);
            assert!(!timer.running);
        });
    }

    #[test]
    fn test_report_raised_once_per_motion() {
        let driver = test_driver();
        driver.arm(1, Direction::Clockwise, 1000);
        run_to_halt(&driver);
        assert!(driver.try_take_report().is_some());

        // Late alarm after halt
        assert_eq!(driver.on_alarm(), AlarmAction::Halt);
        assert_eq!(driver.try_take_report(), None);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let driver = test_driver();
        driver.arm(100, Direction::CounterClockwise, 500);
        driver.on_alarm();

        for _ in 0..3 {
            driver.stop();
            assert!(!driver.is_moving());
            driver.inspect(|out, timer| {
                assert_eq!(out.last(), Some(PHASE_OFF));
                assert!(!timer.running);
            });
        }
        assert_eq!(
            driver.try_take_report(),
            Some(MotionReport::Interrupted {
                position: -1,
                remaining: 99
            })
        );
        assert_eq!(driver.try_take_report(), None);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let driver = test_driver();
        driver.stop();
        driver.stop();
        assert!(!driver.is_moving());
        assert_eq!(driver.try_take_report(), None);
        assert_eq!(driver.position(), 0);
    }

    #[test]
    fn test_stop_after_last_step_reports_complete() {
        let driver = test_driver();
        driver.arm(2, Direction::Clockwise, 500);
        driver.on_alarm();
        driver.on_alarm();
        driver.stop();
        assert_eq!(
            driver.try_take_report(),
            Some(MotionReport::Completed { position: 2 })
        );
    }

    #[test]
    fn test_rearm_replaces_in_flight_motion() {
        let driver = test_driver();
        driver.arm(100, Direction::Clockwise, 500);
        for _ in 0..30 {
            driver.on_alarm();
        }
        assert_eq!(driver.position(), 30);

        driver.arm(10, Direction::CounterClockwise, 500);
        assert_eq!(driver.motion().executed_steps(), 0);
        assert_eq!(driver.position(), 30);

        run_to_halt(&driver);
        assert_eq!(driver.position(), 20);
        assert_eq!(
            driver.try_take_report(),
            Some(MotionReport::Completed { position: 20 })
        );
        // Last CW write was entry 29 % 8 = 5, the reversal resumes at 4
        driver.inspect(|out, _| {
            assert_eq!(out.writes[30], PHASE_TABLE[5]);
            assert_eq!(out.writes[31], PHASE_TABLE[4]);
            assert_eq!(out.writes[32], PHASE_TABLE[3]);
        });
    }

    #[test]
    fn test_rearm_clears_stale_report() {
        let driver = test_driver();
        driver.arm(1, Direction::Clockwise, 500);
        run_to_halt(&driver);

        driver.arm(3, Direction::Clockwise, 500);
        assert_eq!(driver.try_take_report(), None);
    }

    #[test]
    fn test_set_position_does_not_move() {
        let driver = test_driver();
        driver.set_position(2048);
        assert_eq!(driver.position(), 2048);
        assert!(!driver.is_moving());
        driver.inspect(|out, timer| {
            assert_eq!(out.writes.len(), 1);
            assert!(!timer.running);
        });
    }

    #[test]
    fn test_wait_done_resolves_after_halt() {
        let driver = test_driver();
        driver.arm(4, Direction::Clockwise, 500);
        run_to_halt(&driver);
        let report = embassy_futures::block_on(driver.wait_done());
        assert_eq!(report, MotionReport::Completed { position: 4 });
    }

    #[test]
    fn test_stop_races_alarm_handler() {
        let driver: StepperDriver<CriticalSectionRawMutex, _, _> = StepperDriver::new(
            RecordingOutput::default(),
            FakeAlarm::default(),
            DriverConfig::default(),
        )
        .unwrap();
        driver.arm(1_000_000, Direction::Clockwise, 100);

        let delivered = std::thread::scope(|s| {
            let alarms = s.spawn(|| {
                let mut steps = 0u32;
                while driver.inspect(|_, timer| timer.running) {
                    if driver.on_alarm() == AlarmAction::Continue {
                        steps += 1;
                    }
                }
                steps
            });
            while driver.position() < 500 {
                std::thread::yield_now();
            }
            driver.stop();
            alarms.join().unwrap()
        });

        assert!(!driver.is_moving());
        assert_eq!(driver.position(), i64::from(delivered));
        driver.inspect(|out, _| assert_eq!(out.last(), Some(PHASE_OFF)));
        match driver.try_take_report() {
            Some(MotionReport::Interrupted {
                position,
                remaining,
            }) => {
                assert_eq!(position, i64::from(delivered));
                assert_eq!(remaining, 1_000_000 - delivered);
            }
            // The alarm thread outran the stop
            Some(MotionReport::Completed { position }) => {
                assert_eq!(position, 1_000_000);
            }
            None => panic!("no completion report"),
        }
    }
}
