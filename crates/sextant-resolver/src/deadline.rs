use crate::error::{ResolveError, Stage};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A per-call deadline shared by every collaborator call of one resolve.
///
/// Computed once when the call starts, so a slow block fetch leaves less
/// time for the proof fetch rather than resetting the clock.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline: collaborator calls run until they finish or the caller drops the future.
    pub fn none() -> Self {
        Deadline(None)
    }

    /// A deadline `timeout` from now, or none.
    pub fn after(timeout: Option<Duration>) -> Self {
        Deadline(timeout.map(|t| Instant::now() + t))
    }

    /// Await `fut`, failing with `DeadlineExceeded` if the deadline passes first.
    /// The abandoned future is dropped, cancelling the collaborator call.
    pub async fn run<F: Future>(&self, stage: Stage, fut: F) -> Result<F::Output, ResolveError> {
        match self.0 {
            None => Ok(fut.await),
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| ResolveError::DeadlineExceeded { stage }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_waits() {
        let out = Deadline::none()
            .run(Stage::BlockRetrieval, async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                7
            })
            .await
            .unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::after(Some(Duration::from_secs(1)));
        let result = deadline
            .run(Stage::StorageProof, tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(matches!(
            result,
            Err(ResolveError::DeadlineExceeded {
                stage: Stage::StorageProof
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_shared_across_stages() {
        let deadline = Deadline::after(Some(Duration::from_secs(3)));
        deadline
            .run(Stage::BlockRetrieval, tokio::time::sleep(Duration::from_secs(2)))
            .await
            .unwrap();
        // 1s left, not 3
        let result = deadline
            .run(Stage::StorageProof, tokio::time::sleep(Duration::from_secs(2)))
            .await;
        assert!(matches!(result, Err(ResolveError::DeadlineExceeded { .. })));
    }
}
