//! Motion queue and executor
//!
//! Producers submit [`StepCommand`]s into a small bounded channel and
//! suspend when it is full. A single [`MotionExecutor`] drains it, runs
//! each command to completion on the driver and raises the completion
//! flag, so at most one motion is active at a time.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;

use super::command::StepCommand;
use super::driver::{MotionReport, StepperDriver};
use crate::traits::{AlarmTimer, PhaseOutput};

/// Queue capacity
pub const MOTION_QUEUE_DEPTH: usize = 4;

/// Level-set flag raised once per executed command
///
/// `wait()` consumes the report and clears the flag.
pub type CompletionFlag<M> = Signal<M, MotionReport>;

/// Bounded command queue
pub struct MotionQueue<M: RawMutex> {
    channel: Channel<M, StepCommand, MOTION_QUEUE_DEPTH>,
}

impl<M: RawMutex> MotionQueue<M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a command, waiting while the queue is full
    pub async fn submit(&self, cmd: StepCommand) {
        self.channel.send(cmd).await;
    }

    /// Enqueue without waiting; a full queue hands the command back
    pub fn try_submit(&self, cmd: StepCommand) -> Result<(), StepCommand> {
        match self.channel.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => Err(cmd),
        }
    }

    /// Wait for the next command
    pub async fn next(&self) -> StepCommand {
        self.channel.receive().await
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

impl<M: RawMutex> Default for MotionQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// The single consumer of a [`MotionQueue`]
pub struct MotionExecutor<'a, M: RawMutex, O, T> {
    queue: &'a MotionQueue<M>,
    driver: &'a StepperDriver<M, O, T>,
    completion: &'a CompletionFlag<M>,
}

impl<'a, M: RawMutex, O: PhaseOutput, T: AlarmTimer> MotionExecutor<'a, M, O, T> {
    pub fn new(
        queue: &'a MotionQueue<M>,
        driver: &'a StepperDriver<M, O, T>,
        completion: &'a CompletionFlag<M>,
    ) -> Self {
        Self {
            queue,
            driver,
            completion,
        }
    }

    /// Run one command to its end and raise the completion flag
    pub async fn execute(&self, cmd: StepCommand) -> MotionReport {
        self.driver.arm_command(&cmd);
        let report = self.driver.wait_done().await;
        self.completion.signal(report);
        report
    }

    /// Take the next queued command and execute it
    pub async fn run_once(&self) -> (StepCommand, MotionReport) {
        let cmd = self.queue.next().await;
        let report = self.execute(cmd).await;
        (cmd, report)
    }

    /// Execute queued commands forever
    pub async fn run(&self) -> ! {
        loop {
            self.run_once().await;
        }
    }
}
