use std::time::Duration;
use tokio::time::Instant;

/// Poll `condition` every `interval` until it holds or `timeout` elapses.
///
/// Returns `true` as soon as the condition holds, `false` on timeout. The
/// condition is always checked at least once, and once more at the deadline.
pub async fn wait_for<F>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
