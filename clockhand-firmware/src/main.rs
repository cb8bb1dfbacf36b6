//! Clockhand - Stepper Clock Hand Firmware
//!
//! Main firmware binary for RP2040 boards driving a 28BYJ-48 style
//! unipolar stepper through a ULN2003 board. Motor wiring and rates come
//! from `clock.toml`.
//!
//! Two execution contexts: the step alarm runs on a high-priority
//! interrupt executor, everything else on the thread-mode executor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::watchdog::Watchdog;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use clockhand_core::motion::StepperDriver;
use clockhand_hal_rp2040::{PhaseBundle, PinBank, TickerAlarm};

use crate::channels::ALARM_CONTROL;

mod channels;
mod config;
mod tasks;
mod time;

/// The clock hand's stepper driver
pub type HandDriver = StepperDriver<CriticalSectionRawMutex, PhaseBundle<'static>, TickerAlarm>;

/// Runs the step alarm above every thread-mode task
static ALARM_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

// Shared by the alarm task and the stepper task
static DRIVER: StaticCell<HandDriver> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    ALARM_EXECUTOR.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Clockhand firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    let tick_profile = unwrap!(config.tick_profile());
    let adjust_profile = unwrap!(config.adjust_profile());
    info!(
        "Motor: pins {}, {} steps/rev, tick {} us/step, adjust {} us/step",
        config.motor.pins,
        config.motor.steps_per_rev,
        tick_profile.interval_us(),
        adjust_profile.interval_us()
    );

    let (mut bank, board) = PinBank::from_peripherals(p);

    // No actuator, no clock: any failure here is fatal
    let bundle = unwrap!(PhaseBundle::from_bank(&mut bank, config.motor.pins));
    let alarm = TickerAlarm::new(&ALARM_CONTROL);
    let driver: &'static HandDriver =
        DRIVER.init(unwrap!(StepperDriver::new(bundle, alarm, config.driver_config())));

    // Position reference: the dial step the hand points at right now
    driver.set_position(tick_profile.dial_steps_for_time(config.clock.hand_time));
    info!("Stepper driver initialized at position {}", driver.position());

    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let alarm_spawner = ALARM_EXECUTOR.start(interrupt::SWI_IRQ_1);
    unwrap!(alarm_spawner.spawn(tasks::alarm_task(driver)));

    let watchdog = config.watchdog_ms().map(|ms| {
        let mut watchdog = Watchdog::new(board.watchdog);
        watchdog.pause_on_debug(true);
        watchdog.start(Duration::from_millis(u64::from(ms)));
        info!("Watchdog started: {} ms", ms);
        watchdog
    });
    if watchdog.is_none() {
        warn!("Watchdog disabled");
    }

    let clock_config = tasks::ClockTaskConfig {
        tick_profile,
        adjust_profile,
        check_interval_ms: config.clock.check_interval_ms,
        hand_time: config.clock.hand_time,
        start_time: config.clock.start_time,
    };

    unwrap!(spawner.spawn(tasks::stepper_task(driver)));
    unwrap!(spawner.spawn(tasks::clock_task(clock_config, watchdog)));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!(
            "Main loop heartbeat: position={} moving={}",
            driver.position(),
            driver.is_moving()
        );
    }
}
