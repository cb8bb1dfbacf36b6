//! Inter-task communication channels
//!
//! Static embassy-sync primitives shared between tasks. The stepper driver
//! itself is not here: it is built in `main` and handed to the tasks that
//! use it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use clockhand_core::clock::ClockTime;
use clockhand_core::motion::{CompletionFlag, MotionQueue};
use clockhand_hal_rp2040::AlarmSignal;

/// Step commands from the clock task (or any producer) to the stepper task
pub static MOTION_QUEUE: MotionQueue<CriticalSectionRawMutex> = MotionQueue::new();

/// Raised by the stepper task once per executed command
pub static MOTION_COMPLETE: CompletionFlag<CriticalSectionRawMutex> = Signal::new();

/// Set the hand (and the time source) to a new time
///
/// Posted by whatever synchronizes wall-clock time.
pub static ADJUST_REQUEST: Signal<CriticalSectionRawMutex, ClockTime> = Signal::new();

/// Leave the error state; the value is the time the hand now shows
pub static RESET_REQUEST: Signal<CriticalSectionRawMutex, ClockTime> = Signal::new();

/// Start/stop requests from the driver's alarm timer to the alarm task
pub static ALARM_CONTROL: AlarmSignal = Signal::new();
