//! Push-transport trait: the seam between the core and the wire.
//!
//! The core never talks to the network directly. It serializes payloads and
//! hands them to a [`CarrierTransport`] implementation together with the
//! application's message-kind tag, leaving wire format and connection
//! handling entirely to the transport (a WebSocket hub, an in-process
//! loopback, ...).

use crate::error::TransportError;
use crate::receiver::ReceiverId;
use async_trait::async_trait;
use std::sync::Arc;

/// One-way push transport delivering a tagged, serialized payload.
///
/// `M` is the application-defined message-kind discriminator (typically an
/// enum); the core treats it as opaque. Payloads arrive already serialized.
///
/// Send failures are reported to the caller of the originating carrier
/// operation; they must not leave the transport in a state that breaks
/// later sends to other receivers.
///
/// # Example
///
/// ```rust,ignore
/// struct HubTransport { hub: WebSocketHub }
///
/// #[async_trait]
/// impl CarrierTransport<MessageKind> for HubTransport {
///     async fn send_to(
///         &self,
///         id: &ReceiverId,
///         kind: &MessageKind,
///         payload: &str,
///     ) -> Result<(), TransportError> {
///         self.hub.push(id.as_str(), kind, payload).await
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait CarrierTransport<M>: Send + Sync {
    /// Push a message to a single endpoint.
    async fn send_to(
        &self,
        id: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError>;

    /// Push a message to every connected endpoint.
    async fn send_to_all(&self, kind: &M, payload: &str) -> Result<(), TransportError>;

    /// Push a message to every connected endpoint except one.
    async fn send_to_all_except(
        &self,
        except: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError>;
}

#[async_trait]
impl<M, T> CarrierTransport<M> for Arc<T>
where
    M: Send + Sync + 'static,
    T: CarrierTransport<M> + ?Sized,
{
    async fn send_to(
        &self,
        id: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError> {
        (**self).send_to(id, kind, payload).await
    }

    async fn send_to_all(&self, kind: &M, payload: &str) -> Result<(), TransportError> {
        (**self).send_to_all(kind, payload).await
    }

    async fn send_to_all_except(
        &self,
        except: &ReceiverId,
        kind: &M,
        payload: &str,
    ) -> Result<(), TransportError> {
        (**self).send_to_all_except(except, kind, payload).await
    }
}
