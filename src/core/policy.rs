//! Cache refresh decisions

use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// Nothing usable is cached: discard and repopulate.
    FullFetch,
    /// Cache exists but the server's next update time has passed.
    IncrementalUpdate,
    ServeCache,
}

/// Decides how to answer a rate request given the stored next-update time.
pub fn decide(now: i64, stored_next: Option<i64>, cache_empty: bool) -> RefreshAction {
    match stored_next {
        None => RefreshAction::FullFetch,
        Some(_) if cache_empty => RefreshAction::FullFetch,
        Some(next) if now >= next => RefreshAction::IncrementalUpdate,
        Some(_) => RefreshAction::ServeCache,
    }
}

/// Source of the current time in Unix seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_without_timestamp_is_full_fetch() {
        assert_eq!(decide(100, None, true), RefreshAction::FullFetch);
        assert_eq!(decide(100, None, false), RefreshAction::FullFetch);
    }

    #[test]
    fn test_decide_with_empty_cache_is_full_fetch() {
        assert_eq!(decide(100, Some(200), true), RefreshAction::FullFetch);
        assert_eq!(decide(300, Some(200), true), RefreshAction::FullFetch);
    }

    #[test]
    fn test_decide_stale_cache_is_incremental() {
        assert_eq!(decide(200, Some(200), false), RefreshAction::IncrementalUpdate);
        assert_eq!(decide(201, Some(200), false), RefreshAction::IncrementalUpdate);
    }

    #[test]
    fn test_decide_fresh_cache_is_served() {
        assert_eq!(decide(199, Some(200), false), RefreshAction::ServeCache);
    }

    #[test]
    fn test_decide_exhaustive_grid() {
        let times = [i64::MIN, -1, 0, 1, 1_700_000_000, i64::MAX];
        for &now in &times {
            for stored in times.iter().copied().map(Some).chain([None]) {
                for cache_empty in [true, false] {
                    let action = decide(now, stored, cache_empty);
                    assert_eq!(
                        action == RefreshAction::FullFetch,
                        stored.is_none() || cache_empty
                    );
                    if !cache_empty {
                        assert_eq!(
                            action == RefreshAction::IncrementalUpdate,
                            stored.is_some_and(|next| now >= next)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.now_unix() > 1_600_000_000);
    }
}
