//! L3 Molecular Layer: Progress-driven bottom sheet
//!
//! A single progress value animates between 0 (closed) and 1 (open). The
//! renderer derives the sheet's vertical translation from it, and secondary
//! chrome waits for [`SheetController::is_fully_open`].

use std::time::Duration;

use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::easing::{EasingType, EasingTypeExt};
use super::scheduler::FrameScheduler;
use super::timing::lerp;
use crate::config::MotionConfig;
use crate::stats::Period;

pub const DEFAULT_SHEET_DURATION: Duration = Duration::from_millis(420);

/// Progress above which the sheet counts as fully open
pub const DEFAULT_FULLY_OPEN_THRESHOLD: f64 = 0.9;

/// Snapshot of the sheet's animated value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetProgress {
    /// In [0, 1]
    pub value: f64,
    /// True once the last run completed at its endpoint
    pub settled: bool,
}

#[derive(Debug)]
pub struct SheetController<C: Clock = SystemClock> {
    scheduler: FrameScheduler<C>,
    duration: Duration,
    easing: EasingType,
    fully_open_threshold: f64,
    progress: f64,
    from: f64,
    to: f64,
    settled: bool,
    visible: bool,
}

impl<C: Clock> SheetController<C> {
    pub fn new(clock: C) -> Self {
        Self {
            scheduler: FrameScheduler::new(clock).with_subject("sheet"),
            duration: DEFAULT_SHEET_DURATION,
            easing: EasingType::EaseInOutQuad,
            fully_open_threshold: DEFAULT_FULLY_OPEN_THRESHOLD,
            progress: 0.0,
            from: 0.0,
            to: 0.0,
            settled: true,
            visible: false,
        }
    }

    pub fn from_config(clock: C, config: &MotionConfig) -> Self {
        let mut sheet = Self::new(clock)
            .with_duration(Duration::from_millis(config.sheet_duration_ms))
            .with_easing(config.sheet_easing);
        sheet.fully_open_threshold = config.fully_open_threshold;
        sheet
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.animate_to(1.0);
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.animate_to(0.0);
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.close();
        } else {
            self.open();
        }
    }

    /// Re-affirm the open target after fresh summary data arrives
    ///
    /// A run toward 1 restarts from the current progress rather than being
    /// left to finish. Does nothing while the sheet is closed or closing.
    pub fn on_summary_changed(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        debug!(progress = self.progress, "Summary changed while sheet open");
        self.animate_to(1.0)
    }

    /// Start a run toward `target`; returns whether a run started
    ///
    /// When the sheet already rests exactly at `target` the value is set
    /// directly and the sheet reports settled.
    pub fn animate_to(&mut self, target: f64) -> bool {
        let target = target.clamp(0.0, 1.0);
        self.scheduler.cancel_all();
        if self.progress == target {
            self.progress = target;
            self.to = target;
            self.settled = true;
            return false;
        }
        self.from = self.progress;
        self.to = target;
        self.settled = false;
        self.scheduler.run(self.duration);
        true
    }

    /// Advance one frame; returns whether progress changed
    pub fn tick(&mut self) -> bool {
        let Some(frame) = self.scheduler.tick() else {
            return false;
        };
        if frame.done {
            self.progress = self.to;
            self.settled = true;
        } else {
            self.progress = lerp(self.from, self.to, self.easing.apply(frame.progress));
        }
        true
    }

    /// Cancel any run where it stands
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn snapshot(&self) -> SheetProgress {
        SheetProgress {
            value: self.progress,
            settled: self.settled,
        }
    }

    /// Vertical translation as a fraction of the sheet height (1 = hidden)
    pub fn translate_y_fraction(&self) -> f64 {
        1.0 - self.progress.clamp(0.0, 1.0)
    }

    /// Gate for secondary chrome; drops immediately on close
    pub fn is_fully_open(&self) -> bool {
        self.visible && self.progress > self.fully_open_threshold
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether anything of the sheet is on screen
    pub fn is_shown(&self) -> bool {
        self.visible || self.progress > 0.0
    }

    /// Endpoint of the current or last run
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Next period for the footer's cycle action
    ///
    /// Rejected while the sheet is mid-animation so rapid triggers can't
    /// queue overlapping jumps.
    pub fn cycle_period(&self, current: Period) -> Option<Period> {
        if self.is_animating() {
            debug!("Period cycle rejected during sheet animation");
            return None;
        }
        Some(current.cycle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::clock::ManualClock;

    fn sheet() -> (ManualClock, SheetController<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), SheetController::new(clock))
    }

    fn settle(clock: &ManualClock, sheet: &mut SheetController<ManualClock>) {
        while sheet.is_animating() {
            clock.advance_ms(16);
            sheet.tick();
        }
    }

    #[test]
    fn test_open_and_close() {
        let (clock, mut sheet) = sheet();
        assert_eq!(sheet.translate_y_fraction(), 1.0);

        sheet.open();
        assert!(!sheet.is_settled());
        clock.advance_ms(210);
        sheet.tick();
        assert!((sheet.progress() - 0.5).abs() < 1e-6);

        settle(&clock, &mut sheet);
        assert_eq!(sheet.progress(), 1.0);
        assert!(sheet.is_settled());
        assert_eq!(sheet.translate_y_fraction(), 0.0);

        sheet.close();
        settle(&clock, &mut sheet);
        assert_eq!(sheet.progress(), 0.0);
        assert!(!sheet.is_shown());
    }

    #[test]
    fn test_open_when_open_is_noop() {
        let (clock, mut sheet) = sheet();
        sheet.open();
        settle(&clock, &mut sheet);

        sheet.open();
        assert!(!sheet.is_animating());
        assert!(sheet.is_settled());
        assert_eq!(sheet.progress(), 1.0);

        let (_, mut closed) = self::sheet();
        closed.close();
        assert!(!closed.is_animating());
        assert!(closed.is_settled());
    }

    #[test]
    fn test_fully_open_flag() {
        let (clock, mut sheet) = sheet();
        sheet.open();
        clock.advance_ms(300);
        sheet.tick();
        assert!(sheet.progress() < 0.9);
        assert!(!sheet.is_fully_open());

        settle(&clock, &mut sheet);
        assert!(sheet.is_fully_open());

        // Flips back as soon as closing starts, before progress moves
        sheet.close();
        assert!(sheet.progress() > 0.9);
        assert!(!sheet.is_fully_open());
    }

    #[test]
    fn test_summary_change_restarts_open_run() {
        let (clock, mut sheet) = sheet();
        sheet.open();
        clock.advance_ms(210);
        sheet.tick();
        let midway = sheet.progress();

        assert!(sheet.on_summary_changed());
        let mut last = midway;
        while sheet.is_animating() {
            clock.advance_ms(16);
            sheet.tick();
            assert!(sheet.progress() >= last);
            last = sheet.progress();
        }
        assert_eq!(sheet.progress(), 1.0);
    }

    #[test]
    fn test_summary_change_ignored_when_closed() {
        let (clock, mut sheet) = sheet();
        assert!(!sheet.on_summary_changed());

        sheet.open();
        settle(&clock, &mut sheet);
        sheet.close();
        clock.advance_ms(100);
        sheet.tick();
        assert!(!sheet.on_summary_changed());
        assert_eq!(sheet.target(), 0.0);
    }

    #[test]
    fn test_cycle_rejected_while_animating() {
        let (clock, mut sheet) = sheet();
        assert_eq!(sheet.cycle_period(Period::Month), Some(Period::Quarter));

        sheet.open();
        assert_eq!(sheet.cycle_period(Period::Month), None);

        settle(&clock, &mut sheet);
        assert_eq!(sheet.cycle_period(Period::Year), Some(Period::Week));
    }
}
