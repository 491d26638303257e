//! L3 Molecular Layer: Per-subject frame loop
//!
//! A [`FrameScheduler`] owns at most one live run. The host calls
//! [`FrameScheduler::tick`] once per rendered frame; the scheduler reports the
//! run's progress, recomputed from the clock each time. Starting a new run
//! drops the previous one before it can report another frame, so two runs can
//! never write the same subject's state.

use std::time::Duration;

use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::timing::progress;

/// Identifies one run of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunHandle(u64);

/// One frame of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Run that produced this frame
    pub handle: RunHandle,
    /// Linear progress in [0, 1]
    pub progress: f64,
    /// True on the final frame; the run is gone once this is returned
    pub done: bool,
}

#[derive(Debug, Clone, Copy)]
struct ActiveRun {
    handle: RunHandle,
    start: Duration,
    duration: Duration,
}

/// Frame loop for a single animated subject
#[derive(Debug)]
pub struct FrameScheduler<C: Clock = SystemClock> {
    clock: C,
    active: Option<ActiveRun>,
    next_id: u64,
    subject: &'static str,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            active: None,
            next_id: 0,
            subject: "anonymous",
        }
    }

    /// Name the subject in log output
    pub fn with_subject(mut self, subject: &'static str) -> Self {
        self.subject = subject;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Begin a run, cancelling any run that is still live
    pub fn run(&mut self, duration: Duration) -> RunHandle {
        if let Some(previous) = self.cancel_all() {
            debug!(subject = self.subject, run = previous.0, "Superseded in-flight run");
        }
        self.next_id += 1;
        let handle = RunHandle(self.next_id);
        self.active = Some(ActiveRun {
            handle,
            start: self.clock.now(),
            duration,
        });
        debug!(
            subject = self.subject,
            run = handle.0,
            duration_ms = duration.as_millis() as u64,
            "Started run"
        );
        handle
    }

    /// Cancel a specific run
    ///
    /// Returns false when the handle is not the live run (already finished or
    /// superseded), in which case nothing changes.
    pub fn cancel(&mut self, handle: RunHandle) -> bool {
        match self.active {
            Some(run) if run.handle == handle => {
                self.active = None;
                debug!(subject = self.subject, run = handle.0, "Cancelled run");
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is live
    pub fn cancel_all(&mut self) -> Option<RunHandle> {
        self.active.take().map(|run| run.handle)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<RunHandle> {
        self.active.map(|run| run.handle)
    }

    /// Advance the live run
    ///
    /// Returns `None` when nothing is running. The frame with `done == true`
    /// is reported exactly once and ends the run.
    pub fn tick(&mut self) -> Option<Frame> {
        let run = self.active?;
        let progress = progress(run.start, self.clock.now(), run.duration);
        let done = progress >= 1.0;
        if done {
            self.active = None;
            trace!(subject = self.subject, run = run.handle.0, "Run finished");
        }
        Some(Frame {
            handle: run.handle,
            progress,
            done,
        })
    }

    /// Callback form of [`tick`](Self::tick)
    ///
    /// `on_frame` receives the progress; `on_done` runs right after it on the
    /// final frame. Returns whether a frame was produced.
    pub fn tick_with<F, D>(&mut self, on_frame: F, on_done: D) -> bool
    where
        F: FnOnce(f64),
        D: FnOnce(),
    {
        match self.tick() {
            Some(frame) => {
                on_frame(frame.progress);
                if frame.done {
                    on_done();
                }
                true
            }
            None => false,
        }
    }
}

impl<C: Clock> Drop for FrameScheduler<C> {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            trace!(subject = self.subject, run = run.handle.0, "Released run on teardown");
        }
    }
}
