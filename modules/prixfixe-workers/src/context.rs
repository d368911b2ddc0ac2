//! Per-delivery context: the caller's deadline and cancellation signal.

use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Passed to every `handle_message` call. Every outbound step runs under it.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl MessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Fails if the context is already cancelled or past its deadline.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancellation.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `step` to completion unless the context ends first.
    ///
    /// A step is never started once the context has ended. A context error is
    /// returned as the step's own error.
    pub async fn run<T, F>(&self, step: F) -> anyhow::Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        self.check()?;

        let bounded = async {
            match self.deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), step)
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ContextError::DeadlineExceeded.into()),
                    }
                }
                None => step.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(ContextError::Cancelled.into()),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_context_runs_the_step() {
        let ctx = MessageContext::new();
        let value = ctx.run(async { Ok::<_, anyhow::Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_context_never_starts_the_step() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = MessageContext::new().with_cancellation(token);

        let started = std::sync::atomic::AtomicBool::new(false);
        let err = ctx
            .run(async {
                started.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<_, anyhow::Error>(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<ContextError>(), Some(&ContextError::Cancelled));
        assert!(!started.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn deadline_interrupts_a_slow_step() {
        let ctx = MessageContext::new().with_timeout(Duration::from_millis(20));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, anyhow::Error>(())
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ContextError>(),
            Some(&ContextError::DeadlineExceeded)
        );
    }

    #[tokio::test]
    async fn cancellation_mid_step_aborts_it() {
        let token = CancellationToken::new();
        let ctx = MessageContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, anyhow::Error>(())
            })
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err.downcast_ref::<ContextError>(), Some(&ContextError::Cancelled));
    }

    #[test]
    fn expired_deadline_fails_check() {
        let ctx = MessageContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.check(), Err(ContextError::DeadlineExceeded));
    }
}
