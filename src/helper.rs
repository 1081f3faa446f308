//! Helper utilities for Sockrelay
//!
//! This module provides common utility functions used throughout the application.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Pause after a failed `accept` before trying again
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Last moment any party of a session moved bytes
///
/// Shared by every task of one session, so a quiet task can tell whether
/// its siblings are still busy.
#[derive(Debug)]
pub struct Activity {
    origin: Instant,
    last_millis: AtomicU64,
}

impl Activity {
    /// Start tracking, counting now as active
    pub fn new() -> Self {
        Activity {
            origin: Instant::now(),
            last_millis: AtomicU64::new(0),
        }
    }

    /// Record activity now
    pub fn touch(&self) {
        let now = self.origin.elapsed().as_millis() as u64;
        self.last_millis.fetch_max(now, Ordering::Relaxed);
    }

    /// Time since the last recorded activity
    pub fn quiet_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_millis.load(Ordering::Relaxed));
        self.origin.elapsed().saturating_sub(last)
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive `fut` until it completes or the whole session has been quiet for `idle`
///
/// `None` waits forever. While `fut` is pending, activity recorded elsewhere
/// pushes the deadline back. Once the session has been quiet for the full
/// `idle` the future is dropped and [`io::ErrorKind::TimedOut`] is returned.
pub async fn until_idle<F, T>(idle: Option<Duration>, activity: &Activity, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let Some(limit) = idle else {
        return fut.await;
    };
    tokio::pin!(fut);

    loop {
        let quiet = activity.quiet_for();
        if quiet >= limit {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("session idle for {:?}", limit),
            ));
        }

        tokio::select! {
            result = &mut fut => return result,
            _ = tokio::time::sleep(limit - quiet) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_until_idle_none_waits() {
        let activity = Activity::new();
        let result = until_idle(None, &activity, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_until_idle_passes_through_errors() {
        let activity = Activity::new();
        let result: io::Result<()> = until_idle(Some(Duration::from_secs(1)), &activity, async {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_until_idle_elapses_when_quiet() {
        let activity = Activity::new();
        let result: io::Result<()> = until_idle(Some(Duration::from_millis(50)), &activity, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_until_idle_extended_by_other_activity() {
        let activity = Arc::new(Activity::new());

        // Someone else stays busy for three times the deadline
        let busy = Arc::clone(&activity);
        let ticker = tokio::spawn(async move {
            for _ in 0..15 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                busy.touch();
            }
        });

        let result = until_idle(Some(Duration::from_millis(50)), &activity, async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            Ok("done")
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        ticker.await.unwrap();
    }

    #[test]
    fn test_activity_touch_resets_quiet_time() {
        let activity = Activity::new();
        std::thread::sleep(Duration::from_millis(20));
        assert!(activity.quiet_for() >= Duration::from_millis(20));
        activity.touch();
        assert!(activity.quiet_for() < Duration::from_millis(20));
    }
}
