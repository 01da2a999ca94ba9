//! ManualConnectivity - オンライン状態を手動で切り替える
//!
//! CLI の `--offline` やテストから使います。
//! `online` の最新値がそのまま `is_online()` になり、
//! false → true のたびに `reconnects` が 1 つ増えます。

use tokio::sync::watch;

use crate::ports::Connectivity;

#[derive(Debug)]
pub struct ManualConnectivity {
    online: watch::Sender<bool>,
    reconnects: watch::Sender<u64>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        let (online, _rx) = watch::channel(online);
        let (reconnects, _rx) = watch::channel(0);
        Self { online, reconnects }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Setting the current value again is a no-op.
    pub fn set_online(&self, online: bool) {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if !changed {
            return;
        }
        if online {
            self.reconnects.send_modify(|n| *n += 1);
            tracing::info!("network: online");
        } else {
            tracing::warn!("network: offline");
        }
    }
}

impl Connectivity for ManualConnectivity {
    fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.reconnects.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_reconnects() {
        let conn = ManualConnectivity::offline();
        let mut rx = conn.subscribe();
        assert!(!conn.is_online());

        conn.set_online(true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        assert!(conn.is_online());
    }

    #[test]
    fn only_regaining_connectivity_counts() {
        let conn = ManualConnectivity::online();
        let rx = conn.subscribe();

        conn.set_online(true);
        conn.set_online(false);
        assert!(!rx.has_changed().unwrap());
        assert!(!conn.is_online());

        conn.set_online(true);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn quick_flips_are_not_collapsed() {
        let conn = ManualConnectivity::online();
        let rx = conn.subscribe();

        for _ in 0..3 {
            conn.set_online(false);
            conn.set_online(true);
        }
        assert_eq!(*rx.borrow(), 3);
    }
}
