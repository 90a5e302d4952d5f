use tokio::sync::watch;

/// Host-runtime connectivity signal: a readable online flag plus a
/// became-online event observable through `subscribe`. The embedding shell
/// feeds it from whatever the platform reports.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_online(&self, online: bool) {
        self.tx.send_replace(online);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let monitor = ConnectivityMonitor::new(false);
        let mut rx = monitor.subscribe();
        assert!(!monitor.is_online());

        monitor.set_online(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        assert!(monitor.is_online());
    }
}
