//! Interruptible simulated wait.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::StepError;

/// Sleep for `delay`, resolving early with [`StepError::Aborted`] as soon as
/// `cancel` fires (including when it has already fired on entry).
pub async fn wait_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), StepError> {
    if cancel.is_cancelled() {
        return Err(StepError::Aborted);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StepError::Aborted),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn completes_after_full_delay() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        wait_or_cancel(Duration::from_millis(500), &cancel)
            .await
            .expect("wait should complete");

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(510));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_aborts_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let started = Instant::now();

        let res = wait_or_cancel(Duration::from_secs(10), &cancel).await;

        assert_eq!(res, Err(StepError::Aborted));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_wait_in_progress() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });
        let started = Instant::now();

        let res = wait_or_cancel(Duration::from_secs(10), &cancel).await;

        assert_eq!(res, Err(StepError::Aborted));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
