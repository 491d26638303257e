//! Stats data supply: payload models, the HTTP client and a loader that drops
//! responses superseded by a newer request.

pub mod client;
pub mod loader;
pub mod models;

pub use client::StatsClient;
pub use loader::{RequestGeneration, StatsLoader, StatsQuery, StatsSnapshot, StatsSource, Ticket};
pub use models::{
    chart_target, order_active_first, weighted_items, BreakdownItem, Category, CategoryFilter,
    CategoryItem, CategoryStats, ChartItem, Period, StatsSummary, SubscriptionRow,
    BAR_FALLBACK_COLOR, CATEGORY_FALLBACK_COLOR,
};
