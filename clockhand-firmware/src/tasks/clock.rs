//! Clock task
//!
//! Reads the time source every `check_interval_ms` and lets the clock
//! controller follow it. Also handles adjust and reset requests, and feeds
//! the watchdog while the controller is idle so a hand stuck waiting on a
//! lost completion eventually resets the board.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Ticker};

use clockhand_core::clock::{ClockController, ClockTime, TickOutcome};
use clockhand_core::motion::MotionProfile;
use clockhand_core::state::ClockState;
use clockhand_core::traits::TimeSource;

use crate::channels::{ADJUST_REQUEST, MOTION_COMPLETE, MOTION_QUEUE, RESET_REQUEST};
use crate::time::UptimeClock;

/// Clock task settings
pub struct ClockTaskConfig {
    pub tick_profile: MotionProfile,
    pub adjust_profile: MotionProfile,
    pub check_interval_ms: u32,
    /// Time the hand shows at power-on
    pub hand_time: ClockTime,
    pub start_time: ClockTime,
}

#[embassy_executor::task]
pub async fn clock_task(config: ClockTaskConfig, mut watchdog: Option<Watchdog>) {
    info!("Clock task started");

    let mut time = UptimeClock::new(config.start_time);
    let mut controller = ClockController::new(
        &MOTION_QUEUE,
        &MOTION_COMPLETE,
        config.tick_profile,
        config.adjust_profile,
        config.hand_time,
    );

    // Bring the hand from its power-on position to the current time
    let now = time.now();
    info!("Boot adjust: {} -> {}", config.hand_time, now);
    match controller.adjust(now).await {
        Ok(summary) => info!(
            "Hand set: {} steps {}",
            summary.command.steps, summary.command.direction
        ),
        Err(e) => error!("Boot adjust failed: {}", e),
    }

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.check_interval_ms)));
    let mut reported = ClockState::Idle;

    loop {
        match select3(ticker.next(), ADJUST_REQUEST.wait(), RESET_REQUEST.wait()).await {
            Either3::First(()) => {
                let now = time.now();
                match controller.tick(now).await {
                    TickOutcome::Unchanged | TickOutcome::Suspended => {}
                    TickOutcome::Moved(summary) => {
                        debug!(
                            "Tick {} -> {}: {} steps {}",
                            summary.from, summary.to, summary.command.steps, summary.delta.direction
                        );
                    }
                    TickOutcome::Faulted(kind) => error!("Tick move failed: {}", kind),
                }
            }
            Either3::Second(target) => {
                info!("Adjust request: {} -> {}", controller.shown(), target);
                time.set(target);
                match controller.adjust(target).await {
                    Ok(summary) => info!("Hand set: {} steps", summary.command.steps),
                    Err(e) => warn!("Adjust refused: {}", e),
                }
            }
            Either3::Third(shown) => {
                if controller.reset(shown) {
                    info!("Controller reset, hand shows {}", shown);
                }
            }
        }

        let state = controller.state();
        if state != reported {
            match state {
                ClockState::Error(kind) => error!("Clock controller fault: {}", kind),
                _ => debug!("Clock state: {}", state),
            }
            reported = state;
        }

        if state == ClockState::Idle {
            if let Some(watchdog) = watchdog.as_mut() {
                watchdog.feed();
            }
        }
    }
}
