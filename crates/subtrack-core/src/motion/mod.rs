//! Animated-value and gesture engine
//!
//! Drives the chart reveals, the stats sheet and the swipeable list rows with
//! time-based, cancellable runs. Nothing here renders; hosts read the state
//! after each `tick` and draw it however they like.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves (quadratic in-out, cubic out)
//! - `timing` - Progress and interpolation helpers
//! - `clock` - Injectable monotonic time source
//!
//! ## L3 Molecular Layer
//! - `scheduler` - One live run per subject, frames derived from the clock
//! - `tween` - Keyed value tweening and coverage sweeps
//! - `segments` - Arc/segment projection for ring charts
//! - `swipe` - Pointer-driven reveal state machine for list rows
//! - `sheet` - Progress-driven bottom sheet
//!
//! # Usage
//!
//! ```ignore
//! use subtrack_core::motion::{AnimatableTarget, KeyedTweener, SystemClock};
//!
//! let mut bars = KeyedTweener::new(SystemClock::new());
//! bars.set_target([("netflix", 15.0), ("spotify", 10.0)].into_iter().collect());
//!
//! // Once per rendered frame
//! if bars.tick() {
//!     let height = bars.fraction("netflix");
//! }
//! ```

// L4 Atomic Layer
pub mod clock;
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod scheduler;
pub mod segments;
pub mod sheet;
pub mod swipe;
pub mod tween;

// Re-exports for convenient access
pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::{EasingType, EasingTypeExt};
pub use scheduler::{Frame, FrameScheduler, RunHandle};
pub use segments::{conic_stops, filler, fill_at, ConicStop, Fill, Segment, SegmentPlan, WeightedItem, NEUTRAL_COLOR};
pub use sheet::{SheetController, SheetProgress};
pub use swipe::{
    PointerEvent, PointerKind, PointerType, RowAction, RowCommand, RowIdentity, SwipeList, SwipeOutcome,
    SwipePhase, SwipeRow, SwipeRowState,
};
pub use tween::{AnimatableTarget, CoverageTweener, InterpolatedState, KeyedTweener};
