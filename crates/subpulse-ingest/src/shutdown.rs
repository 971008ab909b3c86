//! Cooperative shutdown shared between the orchestrator and its fetch runs.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side: flips the shared flag once.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Stop dispatching new source runs and ask running ones to stop after
    /// their current item. Idempotent.
    pub fn request_shutdown(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side, held by each fetch run.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested. Never resolves if every
    /// [`ShutdownHandle`] has been dropped without requesting it.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
