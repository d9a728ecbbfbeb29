use tokio::sync::{mpsc, Mutex};

/// Multicast signal channel with no history. Observers subscribed at the
/// moment of emission each receive their own copy; an observer that
/// subscribes afterwards never sees it. Emission waits for each hand-off
/// instead of dropping, so nothing is lost while a subscriber is attached.
pub struct SignalBus<T> {
    subscribers: Mutex<Vec<mpsc::Sender<T>>>,
}

impl<T: Clone> SignalBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub async fn subscribe(&self) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(1);
        self.subscribers.lock().await.push(tx);
        rx
    }

    pub async fn emit(&self, signal: T) {
        // Snapshot the live subscribers so the hand-offs below run without
        // holding the lock.
        let senders = {
            let mut subscribers = self.subscribers.lock().await;
            subscribers.retain(|tx| !tx.is_closed());
            subscribers.clone()
        };

        for tx in senders {
            // A receiver dropped mid-emission is pruned on the next emit.
            let _ = tx.send(signal.clone()).await;
        }
    }
}

impl<T: Clone> Default for SignalBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
