use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable trigger for coordinated shutdown of the accept loop and every
/// live session.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Resolves once shutdown has been requested. If every handle is gone the
/// signal can never fire, so this waits forever.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_reaches_receivers() {
        let (handle, rx) = ShutdownHandle::new();
        let mut late = rx.clone();
        assert!(!handle.is_shutdown());

        let waiter = tokio::spawn(async move {
            let mut rx = rx;
            wait_for_shutdown(&mut rx).await;
        });

        handle.clone().shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Receivers that look after the fact still observe it.
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(&mut late))
            .await
            .unwrap();
        assert!(handle.is_shutdown());
    }

    #[tokio::test]
    async fn test_no_signal_keeps_waiting() {
        let (_handle, mut rx) = ShutdownHandle::new();
        let result =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(&mut rx)).await;
        assert!(result.is_err());
    }
}
