use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use subtrack_core::stats::{Category, StatsSnapshot, SubscriptionRow, Ticket};

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    animation_rate: Duration,
}

/// Result of a background load, sent back to the UI loop
#[derive(Debug)]
pub enum LoadResult {
    /// Summary and by-category payloads of the latest stats request
    Stats(StatsSnapshot),
    /// Subscription list tagged with the request that produced it
    Subscriptions {
        ticket: Ticket,
        rows: Vec<SubscriptionRow>,
    },
    /// Category list for the filter and the move picker
    Categories(Vec<Category>),
    /// A row action reached the backend
    Mutated {
        message: String,
    },
    /// Any load or mutation failed
    Failure {
        context: &'static str,
        error: String,
    },
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_frame_rate(tick_rate_ms, 60)
    }

    /// Handler whose animation polling matches `frame_rate` frames per second
    pub fn with_frame_rate(tick_rate_ms: u64, frame_rate: u32) -> Self {
        let frame_ms = 1000 / u64::from(frame_rate.max(1));
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms.max(1)),
            animation_rate: Duration::from_millis(frame_ms.max(1)),
        }
    }

    pub fn animation_rate(&self) -> Duration {
        self.animation_rate
    }

    /// Poll for the next event at the idle tick rate
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Poll for the next event at the animation frame rate
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.animation_rate)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events, ignore release events
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Mouse(mouse) => Ok(Some(AppEvent::Mouse(mouse))),
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse press, drag or release
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}
