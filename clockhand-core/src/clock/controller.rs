//! Clock hand controller
//!
//! Once per tick the controller compares the time source's reading with
//! the time the hand currently shows. When the minute changed it submits
//! the shortest move to the motion queue and waits for the executor's
//! completion flag before accepting the next request.
//!
//! The controller should be the only producer whose moves are observed on
//! the completion flag it is given. There is no timeout on the wait: a
//! lost completion leaves the controller in [`ClockState::Moving`] or
//! [`ClockState::Adjusting`].

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::angle::AngleDelta;
use super::time::ClockTime;
use crate::motion::{CompletionFlag, MotionProfile, MotionQueue, MotionReport, StepCommand};
use crate::state::{ClockEvent, ClockState, FaultKind};

/// Controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// An earlier move never reported back
    Busy,
    /// The controller is latched in an error state
    Faulted(FaultKind),
}

/// One completed hand move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveSummary {
    /// Time shown before the move
    pub from: ClockTime,
    /// Time shown after the move
    pub to: ClockTime,
    /// Normalized rotation
    pub delta: AngleDelta,
    /// Command handed to the queue
    pub command: StepCommand,
    /// How the motion ended
    pub report: MotionReport,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Same minute as the hand shows, nothing to do
    Unchanged,
    /// The hand moved to the new minute
    Moved(MoveSummary),
    /// The move did not finish; the controller is now in error
    Faulted(FaultKind),
    /// Ticks are ignored until a reset or the outstanding move ends
    Suspended,
}

/// Drives the hand through a [`MotionQueue`]
pub struct ClockController<'a, M: RawMutex> {
    queue: &'a MotionQueue<M>,
    completion: &'a CompletionFlag<M>,
    tick_profile: MotionProfile,
    adjust_profile: MotionProfile,
    state: ClockState,
    shown: ClockTime,
}

impl<'a, M: RawMutex> ClockController<'a, M> {
    /// Create an idle controller
    ///
    /// `hand_time` is the time the hand shows right now.
    pub fn new(
        queue: &'a MotionQueue<M>,
        completion: &'a CompletionFlag<M>,
        tick_profile: MotionProfile,
        adjust_profile: MotionProfile,
        hand_time: ClockTime,
    ) -> Self {
        Self {
            queue,
            completion,
            tick_profile,
            adjust_profile,
            state: ClockState::Idle,
            shown: hand_time,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Time the hand currently shows
    pub fn shown(&self) -> ClockTime {
        self.shown
    }

    /// Follow the time source
    ///
    /// Acts only when `now` is in a different minute than the hand shows.
    pub async fn tick(&mut self, now: ClockTime) -> TickOutcome {
        if self.state != ClockState::Idle {
            return TickOutcome::Suspended;
        }
        if now.same_minute(&self.shown) {
            return TickOutcome::Unchanged;
        }

        let profile = self.tick_profile;
        match self.run_move(ClockEvent::MinuteChanged, now, profile).await {
            Ok(summary) => TickOutcome::Moved(summary),
            Err(kind) => TickOutcome::Faulted(kind),
        }
    }

    /// Set the hand to `target` at the adjust rate
    ///
    /// The move is submitted even when it needs no steps, so the caller
    /// always observes one completion.
    pub async fn adjust(&mut self, target: ClockTime) -> Result<MoveSummary, ClockError> {
        match self.state {
            ClockState::Idle => {}
            ClockState::Error(kind) => return Err(ClockError::Faulted(kind)),
            ClockState::Moving | ClockState::Adjusting => return Err(ClockError::Busy),
        }

        let profile = self.adjust_profile;
        self.run_move(ClockEvent::AdjustRequested, target, profile)
            .await
            .map_err(ClockError::Faulted)
    }

    /// Latch a fault reported from outside the motion path
    pub fn fault(&mut self, kind: FaultKind) {
        self.state = self.state.transition(ClockEvent::DriverFault(kind));
    }

    /// Leave the error state
    ///
    /// `time` becomes the time the hand shows. Returns `false` (and changes
    /// nothing) when the controller is not in error.
    pub fn reset(&mut self, time: ClockTime) -> bool {
        if !self.state.is_error() {
            return false;
        }
        self.state = self.state.transition(ClockEvent::Reset);
        self.shown = time;
        true
    }

    async fn run_move(
        &mut self,
        event: ClockEvent,
        target: ClockTime,
        profile: MotionProfile,
    ) -> Result<MoveSummary, FaultKind> {
        let (delta, command) = profile.command_between(self.shown, target);
        self.state = self.state.transition(event);

        self.completion.reset();
        self.queue.submit(command).await;
        let report = self.completion.wait().await;

        let summary = MoveSummary {
            from: self.shown,
            to: target,
            delta,
            command,
            report,
        };
        match report {
            MotionReport::Completed { .. } => {
                self.state = self.state.transition(ClockEvent::MotionComplete);
                self.shown = target;
                Ok(summary)
            }
            MotionReport::Interrupted { .. } => {
                self.fault(FaultKind::MotionInterrupted);
                Err(FaultKind::MotionInterrupted)
            }
        }
    }
}
