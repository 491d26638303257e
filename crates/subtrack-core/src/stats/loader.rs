use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::models::{CategoryFilter, CategoryStats, Period, StatsSummary};
use crate::Result;

/// Supplier of stats payloads
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn summary(&self, period: Period, category: CategoryFilter) -> Result<StatsSummary>;
    async fn by_category(&self, period: Period) -> Result<CategoryStats>;
}

/// Token identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter
///
/// Each `begin` supersedes every earlier ticket. Clones share the counter so a
/// background task can check whether its ticket is still the latest.
#[derive(Debug, Clone, Default)]
pub struct RequestGeneration {
    counter: Arc<AtomicU64>,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.counter.load(Ordering::SeqCst) == ticket.0
    }
}

/// Parameters of a stats load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsQuery {
    pub period: Period,
    pub category: CategoryFilter,
}

/// Both payloads of one completed load
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub ticket: Ticket,
    pub query: StatsQuery,
    pub summary: StatsSummary,
    pub by_category: CategoryStats,
}

/// Fetches summary and by-category data, discarding superseded responses
pub struct StatsLoader<S: StatsSource> {
    source: Arc<S>,
    generation: RequestGeneration,
}

impl<S: StatsSource> Clone for StatsLoader<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            generation: self.generation.clone(),
        }
    }
}

impl<S: StatsSource> StatsLoader<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            generation: RequestGeneration::new(),
        }
    }

    pub fn generation(&self) -> &RequestGeneration {
        &self.generation
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Load both payloads for `query`
    ///
    /// Returns `Ok(None)` when a newer load began while this one was waiting.
    /// Errors of a superseded load are swallowed the same way.
    pub async fn load(&self, query: StatsQuery) -> Result<Option<StatsSnapshot>> {
        let ticket = self.generation.begin();

        let summary = self.source.summary(query.period, query.category).await;
        if !self.generation.is_current(&ticket) {
            debug!(ticket = ticket.0, "Discarding stale summary response");
            return Ok(None);
        }
        let summary = summary?;

        let by_category = self.source.by_category(query.period).await;
        if !self.generation.is_current(&ticket) {
            debug!(ticket = ticket.0, "Discarding stale by-category response");
            return Ok(None);
        }
        let by_category = by_category?;

        Ok(Some(StatsSnapshot {
            ticket,
            query,
            summary,
            by_category,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::models::{BreakdownItem, CategoryItem};
    use crate::Error;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        summary_calls: AtomicUsize,
        /// Generation bumped mid-flight to simulate a newer request
        interrupt_on_summary: Mutex<Option<RequestGeneration>>,
        interrupt_on_category: Mutex<Option<RequestGeneration>>,
        fail_summary: bool,
    }

    #[async_trait]
    impl StatsSource for FakeSource {
        async fn summary(&self, period: Period, _category: CategoryFilter) -> Result<StatsSummary> {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(generation) = self.interrupt_on_summary.lock().unwrap().take() {
                generation.begin();
            }
            if self.fail_summary {
                return Err(Error::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(StatsSummary {
                period,
                total: 10.0,
                breakdown: vec![BreakdownItem {
                    id: 1,
                    name: "Music".to_string(),
                    category_id: Some(1),
                    color: Some("#ff0000".to_string()),
                    value: 10.0,
                }],
                ..Default::default()
            })
        }

        async fn by_category(&self, period: Period) -> Result<CategoryStats> {
            if let Some(generation) = self.interrupt_on_category.lock().unwrap().take() {
                generation.begin();
            }
            Ok(CategoryStats {
                period,
                items: vec![CategoryItem {
                    category_id: 1,
                    name: "Media".to_string(),
                    color: Some("#00ff00".to_string()),
                    value: 10.0,
                }],
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_generation_supersedes_older_tickets() {
        let generation = RequestGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(&first));

        let second = generation.begin();
        assert!(!generation.is_current(&first));
        assert!(generation.is_current(&second));

        // Clones share the counter
        let shared = generation.clone();
        let third = shared.begin();
        assert!(!generation.is_current(&second));
        assert!(generation.is_current(&third));
    }

    #[tokio::test]
    async fn test_load_returns_both_payloads() {
        let loader = StatsLoader::new(Arc::new(FakeSource::default()));
        let query = StatsQuery {
            period: Period::Year,
            category: CategoryFilter::All,
        };
        let snapshot = loader.load(query).await.unwrap().unwrap();
        assert_eq!(snapshot.query, query);
        assert_eq!(snapshot.summary.period, Period::Year);
        assert_eq!(snapshot.by_category.items.len(), 1);
        assert!(loader.generation().is_current(&snapshot.ticket));
    }

    #[tokio::test]
    async fn test_stale_summary_is_discarded() {
        let source = Arc::new(FakeSource::default());
        let loader = StatsLoader::new(Arc::clone(&source));
        *source.interrupt_on_summary.lock().unwrap() = Some(loader.generation().clone());

        let result = loader.load(StatsQuery::default()).await.unwrap();
        assert!(result.is_none());

        // The next load is unaffected
        assert!(loader.load(StatsQuery::default()).await.unwrap().is_some());
        assert_eq!(source.summary_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_category_response_is_discarded() {
        let source = Arc::new(FakeSource::default());
        let loader = StatsLoader::new(Arc::clone(&source));
        *source.interrupt_on_category.lock().unwrap() = Some(loader.generation().clone());

        assert!(loader.load(StatsQuery::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_errors_propagate_only_when_current() {
        let source = Arc::new(FakeSource {
            fail_summary: true,
            ..Default::default()
        });
        let loader = StatsLoader::new(Arc::clone(&source));
        let err = loader.load(StatsQuery::default()).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));

        *source.interrupt_on_summary.lock().unwrap() = Some(loader.generation().clone());
        assert!(loader.load(StatsQuery::default()).await.unwrap().is_none());
    }
}
