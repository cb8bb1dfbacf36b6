//! Step alarm task
//!
//! Spawned on the high-priority interrupt executor so every step preempts
//! the thread-mode tasks.

use defmt::*;

use clockhand_hal_rp2040::run_alarm;

use crate::channels::ALARM_CONTROL;
use crate::HandDriver;

#[embassy_executor::task]
pub async fn alarm_task(driver: &'static HandDriver) {
    info!("Alarm task started");
    run_alarm(&ALARM_CONTROL, driver).await
}
