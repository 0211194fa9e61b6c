//! Per-store usage counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Put/read counters shared by all concurrent calls on one store.
#[derive(Debug, Default)]
pub struct Stats {
    entries: AtomicU64,
    reads: AtomicU64,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub entries: u64,
    pub reads: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entry(&self) {
        self.entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entries: self.entries.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(Stats::new().snapshot(), StatsSnapshot::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let stats = Arc::new(Stats::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = stats.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    stats.record_entry();
                    stats.record_read();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                entries: 8000,
                reads: 8000
            }
        );
    }

    #[test]
    fn test_snapshot_serializes_as_counts() {
        let snapshot = StatsSnapshot {
            entries: 2,
            reads: 5,
        };
        assert_eq!(
            serde_json::to_value(snapshot).unwrap(),
            serde_json::json!({ "entries": 2, "reads": 5 })
        );
    }
}
