pub mod config;
pub mod error;
pub mod motion;
pub mod stats;

pub use config::{AppConfig, EasingType, MotionConfig, SwipeConfig};
pub use error::{Error, Result};
pub use stats::{Period, StatsClient};
