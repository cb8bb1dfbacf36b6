//! Motion executor task
//!
//! Takes step commands off the motion queue one at a time, runs each to
//! the end on the driver and raises the completion flag.

use defmt::*;

use clockhand_core::motion::{MotionExecutor, MotionReport};

use crate::channels::{MOTION_COMPLETE, MOTION_QUEUE};
use crate::HandDriver;

#[embassy_executor::task]
pub async fn stepper_task(driver: &'static HandDriver) {
    info!("Stepper task started");

    let executor = MotionExecutor::new(&MOTION_QUEUE, driver, &MOTION_COMPLETE);

    loop {
        let (cmd, report) = executor.run_once().await;
        match report {
            MotionReport::Completed { position } => {
                debug!(
                    "Motion done: {} steps {} -> position {}",
                    cmd.steps, cmd.direction, position
                );
            }
            MotionReport::Interrupted {
                position,
                remaining,
            } => {
                warn!(
                    "Motion interrupted at position {} with {} of {} steps left",
                    position, remaining, cmd.steps
                );
            }
        }
    }
}
