//! Cancelable background work owned by a state.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// A spawned timer or network call belonging to one authorization state.
///
/// Dropping the handle cancels the task. The task receives the token and
/// must check it before acting on anything it produced.
#[derive(Debug)]
pub(crate) struct PendingTask {
    token: CancellationToken,
}

impl PendingTask {
    /// Spawns `work` on the current Tokio runtime.
    pub(crate) fn spawn<F, Fut>(work: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        tokio::spawn(work(token.clone()));
        Self { token }
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_drop_cancels_task() {
        let observed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&observed);

        let task = PendingTask::spawn(move |token| async move {
            token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });
        drop(task);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(observed.load(Ordering::SeqCst));
    }
}
