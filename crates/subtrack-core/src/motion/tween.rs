//! L3 Molecular Layer: Keyed value tweening
//!
//! [`KeyedTweener`] interpolates one number per key (bar heights) from the
//! currently displayed values to a new target. [`CoverageTweener`] is the
//! donut variant: it sweeps a single coverage percentage and re-projects
//! segments, since arc boundaries depend on cumulative shares rather than on
//! independently interpolated values.

use std::time::Duration;

use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::easing::{EasingType, EasingTypeExt};
use super::scheduler::FrameScheduler;
use super::segments::{conic_stops, ConicStop, Segment, SegmentPlan, WeightedItem};
use super::timing::{lerp, non_negative};
use crate::config::MotionConfig;

/// Default bar and donut duration
pub const DEFAULT_TWEEN_DURATION: Duration = Duration::from_millis(620);

#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntry {
    pub key: String,
    pub value: f64,
}

/// Desired end state of a keyed animation
///
/// Keys are unique; pushing an existing key replaces its value but keeps its
/// original position. Values are floored to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimatableTarget {
    entries: Vec<TargetEntry>,
}

impl AnimatableTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        let value = non_negative(value);
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => existing.value = value,
            None => self.entries.push(TargetEntry { key, value }),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value)
    }

    /// Largest target value, never below 1
    pub fn max_value(&self) -> f64 {
        self.entries.iter().map(|e| e.value).fold(1.0, f64::max)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for AnimatableTarget {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut target = Self::new();
        for (key, value) in iter {
            target.push(key, value);
        }
        target
    }
}

/// Currently displayed value per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolatedState {
    entries: Vec<(String, f64)>,
}

impl InterpolatedState {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Value for `key`, zero when the key is absent
    #[inline]
    pub fn value(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Largest displayed value, never below 0
    pub fn max_value(&self) -> f64 {
        self.entries.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug)]
struct TweenRun {
    start: InterpolatedState,
}

/// Per-key interpolator for bar charts
#[derive(Debug)]
pub struct KeyedTweener<C: Clock = SystemClock> {
    scheduler: FrameScheduler<C>,
    duration: Duration,
    easing: EasingType,
    state: InterpolatedState,
    target: AnimatableTarget,
    run: Option<TweenRun>,
}

impl<C: Clock> KeyedTweener<C> {
    pub fn new(clock: C) -> Self {
        Self {
            scheduler: FrameScheduler::new(clock).with_subject("bars"),
            duration: DEFAULT_TWEEN_DURATION,
            easing: EasingType::EaseInOutQuad,
            state: InterpolatedState::default(),
            target: AnimatableTarget::default(),
            run: None,
        }
    }

    pub fn from_config(clock: C, config: &MotionConfig) -> Self {
        Self::new(clock)
            .with_duration(Duration::from_millis(config.bar_duration_ms))
            .with_easing(config.bar_easing)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    /// Animate toward a new target
    ///
    /// Always starts a fresh run from the values currently on screen, so an
    /// interrupted animation continues without a jump. Keys missing from the
    /// target are dropped immediately; new keys start from zero. An empty
    /// target clears the state without animating.
    pub fn set_target(&mut self, target: AnimatableTarget) {
        if target.is_empty() {
            self.scheduler.cancel_all();
            self.run = None;
            self.state.clear();
            self.target = target;
            return;
        }

        let start = self.state.clone();
        self.scheduler.run(self.duration);
        debug!(keys = target.len(), "Retargeting bars");
        self.run = Some(TweenRun { start });
        self.target = target;
        self.apply(0.0);
    }

    /// Advance one frame; returns whether displayed values changed
    pub fn tick(&mut self) -> bool {
        let Some(frame) = self.scheduler.tick() else {
            return false;
        };
        if frame.done {
            self.settle();
        } else {
            self.apply(self.easing.apply(frame.progress));
        }
        true
    }

    fn apply(&mut self, eased: f64) {
        let Some(run) = &self.run else {
            return;
        };
        self.state.entries = self
            .target
            .iter()
            .map(|entry| {
                let origin = run.start.value(&entry.key);
                (entry.key.clone(), lerp(origin, entry.value, eased))
            })
            .collect();
    }

    fn settle(&mut self) {
        self.run = None;
        self.state.entries = self
            .target
            .iter()
            .map(|entry| (entry.key.clone(), entry.value))
            .collect();
    }

    /// Cancel any run, leaving values where they are
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
        self.run = None;
    }

    pub fn state(&self) -> &InterpolatedState {
        &self.state
    }

    #[inline]
    pub fn value(&self, key: &str) -> f64 {
        self.state.value(key)
    }

    pub fn target(&self) -> &AnimatableTarget {
        &self.target
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Scale for rendering
    ///
    /// Covers both the eventual target and whatever is on screen right now so
    /// a shrinking bar is not clipped mid-animation.
    pub fn effective_max(&self) -> f64 {
        self.target
            .max_value()
            .max(self.state.max_value())
            .max(1.0)
    }

    /// Displayed value as a fraction of [`effective_max`](Self::effective_max)
    pub fn fraction(&self, key: &str) -> f64 {
        (non_negative(self.value(key)) / self.effective_max()).clamp(0.0, 1.0)
    }
}

/// Coverage sweep for donut charts
#[derive(Debug)]
pub struct CoverageTweener<C: Clock = SystemClock> {
    scheduler: FrameScheduler<C>,
    duration: Duration,
    easing: EasingType,
    plan: SegmentPlan,
    coverage: f64,
    segments: Vec<Segment>,
}

impl<C: Clock> CoverageTweener<C> {
    pub fn new(clock: C) -> Self {
        Self {
            scheduler: FrameScheduler::new(clock).with_subject("donut"),
            duration: DEFAULT_TWEEN_DURATION,
            easing: EasingType::EaseOutCubic,
            plan: SegmentPlan::default(),
            coverage: 0.0,
            segments: Vec::new(),
        }
    }

    pub fn from_config(clock: C, config: &MotionConfig) -> Self {
        Self::new(clock)
            .with_duration(Duration::from_millis(config.donut_duration_ms))
            .with_easing(config.donut_easing)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    /// Re-plan the ring and sweep it in from zero coverage
    pub fn set_items(&mut self, items: &[WeightedItem]) {
        self.plan = SegmentPlan::new(items);
        self.coverage = 0.0;
        self.segments.clear();
        if self.plan.is_empty() {
            self.scheduler.cancel_all();
            return;
        }
        self.scheduler.run(self.duration);
        debug!(segments = self.plan.len(), "Sweeping donut");
    }

    /// Advance one frame; returns whether the segments changed
    pub fn tick(&mut self) -> bool {
        let Some(frame) = self.scheduler.tick() else {
            return false;
        };
        self.coverage = if frame.done {
            100.0
        } else {
            self.easing.apply(frame.progress) * 100.0
        };
        self.segments = self.plan.at(self.coverage);
        true
    }

    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
    }

    #[inline]
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn plan(&self) -> &SegmentPlan {
        &self.plan
    }

    /// Angular stops including the neutral remainder
    pub fn conic_stops(&self) -> Vec<ConicStop> {
        conic_stops(&self.segments)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::clock::ManualClock;

    fn tweener() -> (ManualClock, KeyedTweener<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), KeyedTweener::new(clock))
    }

    fn run_to_end<C: Clock>(clock: &ManualClock, tweener: &mut KeyedTweener<C>) {
        while tweener.is_animating() {
            clock.advance_ms(16);
            tweener.tick();
        }
    }

    #[test]
    fn test_target_push_dedups_and_floors() {
        let target: AnimatableTarget = [("a", 3.0), ("b", -2.0), ("a", 5.0)].into_iter().collect();
        assert_eq!(target.len(), 2);
        assert_eq!(target.get("a"), Some(5.0));
        assert_eq!(target.get("b"), Some(0.0));
        assert_eq!(target.iter().next().map(|e| e.key.as_str()), Some("a"));
    }

    #[test]
    fn test_new_keys_start_at_zero() {
        let (clock, mut tweener) = tweener();
        tweener.set_target([("a", 40.0)].into_iter().collect());
        assert_eq!(tweener.value("a"), 0.0);
        assert_eq!(tweener.state().len(), 1);

        clock.advance_ms(310);
        tweener.tick();
        assert!((tweener.value("a") - 20.0).abs() < 1e-6);

        run_to_end(&clock, &mut tweener);
        assert_eq!(tweener.value("a"), 40.0);
    }

    #[test]
    fn test_stale_keys_dropped() {
        let (clock, mut tweener) = tweener();
        tweener.set_target([("a", 10.0), ("b", 20.0)].into_iter().collect());
        run_to_end(&clock, &mut tweener);

        tweener.set_target([("b", 5.0), ("c", 1.0)].into_iter().collect());
        let keys: Vec<&str> = tweener.state().keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(tweener.value("b"), 20.0);
    }

    #[test]
    fn test_empty_target_clears_and_cancels() {
        let (clock, mut tweener) = tweener();
        tweener.set_target([("a", 10.0)].into_iter().collect());
        clock.advance_ms(100);
        tweener.tick();

        tweener.set_target(AnimatableTarget::new());
        assert!(tweener.state().is_empty());
        assert!(!tweener.is_animating());
        clock.advance_ms(100);
        assert!(!tweener.tick());
    }

    #[test]
    fn test_interrupt_continues_from_displayed_value() {
        let (clock, mut tweener) = tweener();
        tweener.set_target([("a", 100.0)].into_iter().collect());
        clock.advance_ms(310);
        tweener.tick();
        let midway = tweener.value("a");
        assert!(midway > 0.0 && midway < 100.0);

        tweener.set_target([("a", 0.0)].into_iter().collect());
        assert!((tweener.value("a") - midway).abs() < 1e-9);

        clock.advance_ms(16);
        tweener.tick();
        assert!(tweener.value("a") <= midway);
        run_to_end(&clock, &mut tweener);
        assert_eq!(tweener.value("a"), 0.0);
    }

    #[test]
    fn test_effective_max_covers_shrinking_bar() {
        let (clock, mut tweener) = tweener();
        tweener.set_target([("a", 80.0)].into_iter().collect());
        run_to_end(&clock, &mut tweener);

        tweener.set_target([("a", 10.0)].into_iter().collect());
        clock.advance_ms(100);
        tweener.tick();
        assert!(tweener.value("a") > 10.0);
        assert!((tweener.effective_max() - tweener.value("a")).abs() < 1e-9);
        assert!(tweener.fraction("a") <= 1.0);

        run_to_end(&clock, &mut tweener);
        assert_eq!(tweener.effective_max(), 10.0);
    }

    #[test]
    fn test_effective_max_floor_is_one() {
        let (_, mut tweener) = tweener();
        assert_eq!(tweener.effective_max(), 1.0);
        tweener.set_target([("a", 0.25)].into_iter().collect());
        assert_eq!(tweener.effective_max(), 1.0);
    }

    #[test]
    fn test_coverage_sweep() {
        let clock = ManualClock::new();
        let mut donut = CoverageTweener::new(clock.clone());
        donut.set_items(&[
            WeightedItem::new("a", "#ff0000", 75.0),
            WeightedItem::new("b", "#00ff00", 25.0),
        ]);
        assert!(donut.segments().is_empty());

        clock.advance_ms(100);
        donut.tick();
        let early = donut.coverage();
        assert!(early > 0.0 && early < 100.0);

        clock.advance_ms(1000);
        donut.tick();
        assert_eq!(donut.coverage(), 100.0);
        assert_eq!(donut.segments().len(), 2);
        assert!(!donut.is_animating());
    }

    #[test]
    fn test_coverage_empty_items() {
        let clock = ManualClock::new();
        let mut donut = CoverageTweener::new(clock.clone());
        donut.set_items(&[WeightedItem::new("a", "#fff", 0.0)]);
        assert!(!donut.is_animating());
        assert!(donut.segments().is_empty());
        let stops = donut.conic_stops();
        assert_eq!(stops.len(), 1);
    }
}
