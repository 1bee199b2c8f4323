//! In-process loopback transport.
//!
//! Backs each connected receiver with an unbounded mpsc queue. Useful for
//! tests and single-process demos; a production deployment would implement
//! [`CarrierTransport`] over a real hub instead.

use crate::dispatch::CarrierTransport;
use crate::error::TransportError;
use crate::receiver::ReceiverId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// A message as observed by a receiver's queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<M> {
    /// Application message-kind tag, passed through unchanged.
    pub kind: M,
    /// Serialized payload, passed through unchanged.
    pub payload: String,
}

/// Loopback transport delivering into per-receiver mpsc queues.
///
/// # Example
///
/// ```rust,ignore
/// let transport = Arc::new(InMemoryTransport::new());
/// let mut inbox = transport.connect("conn-1");
///
/// // ... carrier.send_to(&"conn-1".into(), &Kind::Ping, &42).await?;
///
/// let delivery = inbox.recv().await.unwrap();
/// assert_eq!(delivery.payload, "42");
/// ```
pub struct InMemoryTransport<M> {
    queues: Mutex<HashMap<ReceiverId, mpsc::UnboundedSender<Delivery<M>>>>,
}

impl<M> InMemoryTransport<M> {
    /// Create a transport with no connected receivers.
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a receiver queue, returning its inbox.
    ///
    /// Reconnecting an id replaces the previous queue.
    pub fn connect(&self, id: impl Into<ReceiverId>) -> mpsc::UnboundedReceiver<Delivery<M>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queues.lock().insert(id.into(), tx);
        rx
    }

    /// Detach a receiver queue; its inbox stops receiving.
    pub fn disconnect(&self, id: &ReceiverId) {
        self.queues.lock().remove(id);
    }
}

impl<M> Default for InMemoryTransport<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M> CarrierTransport<M> for InMemoryTransport<M>
where
    M: Clone + Send + Sync,
{
    async fn send_to(
        &self,
        id: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError> {
        let tx = self
            .queues
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::Disconnected(id.clone()))?;
        tx.send(Delivery {
            kind: kind.clone(),
            payload: payload.to_string(),
        })
        .map_err(|_| TransportError::Disconnected(id.clone()))
    }

    async fn send_to_all(&self, kind: &M, payload: &str) -> Result<(), TransportError> {
        let queues: Vec<_> = self.queues.lock().values().cloned().collect();
        for tx in queues {
            // Broadcast is best-effort: a receiver that dropped its inbox
            // does not fail delivery to the others.
            let _ = tx.send(Delivery {
                kind: kind.clone(),
                payload: payload.to_string(),
            });
        }
        Ok(())
    }

    async fn send_to_all_except(
        &self,
        except: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError> {
        let queues: Vec<_> = self
            .queues
            .lock()
            .iter()
            .filter(|(id, _)| *id != except)
            .map(|(_, tx)| tx.clone())
            .collect();
        for tx in queues {
            let _ = tx.send(Delivery {
                kind: kind.clone(),
                payload: payload.to_string(),
            });
        }
        Ok(())
    }
}
