//! Wait/retry gate for element operations.
//!
//! One poll is one remote query. A failed query and a `false` answer are
//! handled the same way: count the attempt, and either pause and poll again
//! or give up with the element-not-found sentinel.

use std::time::Duration;

use tracing::debug;
use tracing::info;
use uiauto_rpc::ClientConfig;
use uiauto_rpc::ClientError;
use uiauto_rpc::Sleeper;
use uiauto_rpc::UiaError;
use uiauto_rpc::config::wait_retries_or;
use uiauto_rpc::config::wait_secs_or;

use crate::error::Error;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    Exists,
    Gone,
}

impl WaitKind {
    pub fn method(&self) -> &'static str {
        match self {
            WaitKind::Exists => "waitForExists",
            WaitKind::Gone => "waitUntilGone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_retry: u32,
}

impl WaitPolicy {
    /// Caller-supplied bounds; each value outside its range falls back to
    /// the matching field of `fallback` on its own.
    pub fn sanitized(duration_secs: f32, max_retry: i64, fallback: WaitPolicy) -> Self {
        let interval = wait_secs_or(duration_secs, fallback.interval.as_secs_f32());
        Self {
            interval: secs_to_duration(interval),
            max_retry: wait_retries_or(max_retry, fallback.max_retry),
        }
    }

    /// Configured defaults for `kind`.
    pub fn for_kind(kind: WaitKind, config: &ClientConfig) -> Self {
        let (secs, max_retry) = match kind {
            WaitKind::Exists => (
                config.wait_for_exists_duration(),
                config.wait_for_exists_max_retry(),
            ),
            WaitKind::Gone => (
                config.wait_for_disappear_duration(),
                config.wait_for_disappear_max_retry(),
            ),
        };
        Self {
            interval: secs_to_duration(secs),
            max_retry,
        }
    }
}

/// Millisecond precision; `0.3` becomes exactly 300 ms.
fn secs_to_duration(secs: f32) -> Duration {
    Duration::from_millis((secs * 1000.0).round() as u64)
}

/// Poll `probe` until it answers `true` or the retries run out.
///
/// At least one attempt is always made, even with `max_retry == 0`.
pub fn poll<F>(kind: WaitKind, policy: WaitPolicy, sleeper: &dyn Sleeper, mut probe: F) -> Result<()>
where
    F: FnMut() -> std::result::Result<bool, ClientError>,
{
    let mut retry = 0u32;
    loop {
        match probe() {
            Ok(true) => {
                info!(method = kind.method(), attempts = retry + 1, "Wait satisfied");
                return Ok(());
            }
            Ok(false) => {
                debug!(method = kind.method(), attempt = retry + 1, "Condition not met");
            }
            Err(err) => {
                debug!(method = kind.method(), attempt = retry + 1, error = %err, "Wait probe failed");
            }
        }

        retry += 1;
        if retry >= policy.max_retry {
            info!(method = kind.method(), attempts = retry, "Wait retries exhausted");
            return Err(Error::Client(ClientError::Rpc(UiaError::element_not_found())));
        }
        sleeper.sleep(policy.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use uiauto_rpc::MockSleeper;
    use uiauto_rpc::NetworkErrorKind;

    fn policy(millis: u64, max_retry: u32) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_millis(millis),
            max_retry,
        }
    }

    /// Answers false `k` times, then true.
    fn flaky(k: u32) -> (impl FnMut() -> std::result::Result<bool, ClientError>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let probe = move || {
            let n = counter.get();
            counter.set(n + 1);
            Ok(n >= k)
        };
        (probe, calls)
    }

    #[test]
    fn test_method_names() {
        assert_eq!(WaitKind::Exists.method(), "waitForExists");
        assert_eq!(WaitKind::Gone.method(), "waitUntilGone");
    }

    #[test]
    fn test_immediate_success_never_sleeps() {
        let sleeper = MockSleeper::new();
        let (probe, calls) = flaky(0);
        poll(WaitKind::Exists, policy(300, 3), &sleeper, probe).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(sleeper.call_count(), 0);
    }

    #[test]
    fn test_errors_count_as_failed_polls() {
        let sleeper = MockSleeper::new();
        let mut n = 0;
        let probe = || {
            n += 1;
            if n < 3 {
                Err(ClientError::Network {
                    kind: NetworkErrorKind::Connect,
                    message: "refused".to_string(),
                })
            } else {
                Ok(true)
            }
        };
        poll(WaitKind::Gone, policy(100, 5), &sleeper, probe).unwrap();
        assert_eq!(sleeper.call_count(), 2);
    }

    #[test]
    fn test_exhaustion_yields_sentinel() {
        let sleeper = MockSleeper::new();
        let err = poll(WaitKind::Exists, policy(300, 3), &sleeper, || Ok(false)).unwrap_err();
        assert!(err.is_element_not_found());
        assert_eq!(err.to_string(), "RPC error (-32002): Element not found");
        assert_eq!(sleeper.call_count(), 2);
    }

    #[test]
    fn test_zero_retries_still_probes_once() {
        let sleeper = MockSleeper::new();
        let (probe, calls) = flaky(0);
        poll(WaitKind::Exists, policy(300, 0), &sleeper, probe).unwrap();
        assert_eq!(calls.get(), 1);

        let (probe, calls) = flaky(1);
        assert!(poll(WaitKind::Exists, policy(300, 0), &sleeper, probe).is_err());
        assert_eq!(calls.get(), 1);
        assert_eq!(sleeper.call_count(), 0);
    }

    #[test]
    fn test_sanitized_falls_back_per_field() {
        let fallback = policy(300, 3);
        assert_eq!(WaitPolicy::sanitized(1.0, 5, fallback), policy(1000, 5));
        assert_eq!(WaitPolicy::sanitized(61.0, 5, fallback), policy(300, 5));
        assert_eq!(WaitPolicy::sanitized(1.0, 11, fallback), policy(1000, 3));
        assert_eq!(WaitPolicy::sanitized(-1.0, -1, fallback), fallback);
        assert_eq!(WaitPolicy::sanitized(f32::NAN, 2, fallback), policy(300, 2));
    }

    #[test]
    fn test_for_kind_reads_config() {
        let config = ClientConfig::default()
            .with_wait_for_exists(2.0, 4)
            .with_wait_for_disappear(0.5, 1);
        assert_eq!(WaitPolicy::for_kind(WaitKind::Exists, &config), policy(2000, 4));
        assert_eq!(WaitPolicy::for_kind(WaitKind::Gone, &config), policy(500, 1));
    }

    proptest! {
        #[test]
        fn prop_succeeds_after_k_sleeps(k in 0u32..10, extra in 1u32..5) {
            let max_retry = k + extra;
            let sleeper = MockSleeper::new();
            let (probe, calls) = flaky(k);

            prop_assert!(poll(WaitKind::Exists, policy(250, max_retry), &sleeper, probe).is_ok());
            prop_assert_eq!(calls.get(), k + 1);
            prop_assert_eq!(sleeper.call_count(), u64::from(k));
            prop_assert_eq!(sleeper.total_duration(), Duration::from_millis(250) * k);
        }

        #[test]
        fn prop_fails_after_max_retry_attempts(max_retry in 1u32..=10, surplus in 0u32..5) {
            let k = max_retry + surplus;
            let sleeper = MockSleeper::new();
            let (probe, calls) = flaky(k);

            let err = poll(WaitKind::Exists, policy(250, max_retry), &sleeper, probe).unwrap_err();
            prop_assert!(err.is_element_not_found());
            prop_assert_eq!(calls.get(), max_retry);
        }
    }
}
