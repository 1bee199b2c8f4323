//! Dispatch facade: the public send/await/inject surface.
//!
//! [`Carrier`] ties the pieces together: it resolves target ids from the
//! registry, serializes payloads, pushes them through the transport, and —
//! for the `...and_await...` variants — arms completion slots on exactly
//! the snapshot of ids used for sending before racing them against a
//! shared deadline.
//!
//! ```text
//! caller ──► Carrier ──► registry snapshot ──► transport push
//!                │
//!                └─ await variant? ──► arm slots ──► wait coordinator
//!                                                        ▲
//! response injection (ack / answer) ─────────────────────┘
//! ```

use crate::dispatch::{wait, CarrierTransport};
use crate::error::CarrierError;
use crate::receiver::{MonitorCallback, ReceiverId, ReceiverRegistry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Default maximum wait for an ack or answer.
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Server-push facade with ack/answer correlation.
///
/// Generic over the application's message-kind tag `M` and the push
/// transport `T`. Constructed once per server process via
/// [`Carrier::new`] or [`Carrier::builder`] and shared with collaborators
/// (connection lifecycle, response injection) via `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Serialize)]
/// enum Kind { Refresh, Query }
///
/// let carrier = Arc::new(Carrier::new(transport));
///
/// // Connection lifecycle (transport hooks):
/// carrier.add_receiver("conn-1");
///
/// // Push and wait for the ack:
/// let acked = carrier
///     .send_to_and_await_ack(&"conn-1".into(), &Kind::Refresh, &(), None)
///     .await?;
///
/// // Response injection (e.g. an HTTP endpoint):
/// carrier.ack(&"conn-1".into());
/// ```
pub struct Carrier<M, T> {
    registry: Arc<ReceiverRegistry>,
    transport: T,
    default_timeout: Duration,
    _kind: PhantomData<fn() -> M>,
}

impl<M, T> Carrier<M, T>
where
    M: Send + Sync,
    T: CarrierTransport<M>,
{
    /// Create a carrier over a transport with the default await timeout.
    pub fn new(transport: T) -> Self {
        Self {
            registry: Arc::new(ReceiverRegistry::new()),
            transport,
            default_timeout: DEFAULT_AWAIT_TIMEOUT,
            _kind: PhantomData,
        }
    }

    /// Create a builder for explicit configuration.
    pub fn builder() -> CarrierBuilder<M, T> {
        CarrierBuilder::new()
    }

    /// Shared handle to the receiver registry.
    pub fn registry(&self) -> Arc<ReceiverRegistry> {
        self.registry.clone()
    }

    /// Register a connected receiver (connection lifecycle hook).
    pub fn add_receiver(&self, id: impl Into<ReceiverId>) {
        self.registry.add_receiver(id);
    }

    /// Remove a disconnected receiver (connection lifecycle hook).
    pub fn remove_receiver(&self, id: &ReceiverId) {
        self.registry.remove_receiver(id);
    }

    /// Sorted snapshot of the currently registered receiver ids.
    pub fn receiver_ids(&self) -> Vec<ReceiverId> {
        self.registry.all_ids()
    }

    /// Install the membership observer (see
    /// [`ReceiverRegistry::set_monitor`]).
    pub fn set_monitor(&self, callback: MonitorCallback) {
        self.registry.set_monitor(callback);
    }

    // ── Sends ──────────────────────────────────────────────────────────

    /// Push a message to a single receiver, fire-and-forget.
    ///
    /// The payload is serialized to JSON before being handed to the
    /// transport. Only transport and serialization failures surface.
    pub async fn send_to<D: Serialize>(
        &self,
        id: &ReceiverId,
        kind: &M,
        data: &D,
    ) -> Result<(), CarrierError> {
        let payload = serde_json::to_string(data)?;
        tracing::debug!(receiver = %id, "send_to");
        self.transport.send_to(id, kind, &payload).await?;
        Ok(())
    }

    /// Push a message to every connected receiver.
    pub async fn send_to_all<D: Serialize>(&self, kind: &M, data: &D) -> Result<(), CarrierError> {
        let payload = serde_json::to_string(data)?;
        tracing::debug!("send_to_all");
        self.transport.send_to_all(kind, &payload).await?;
        Ok(())
    }

    /// Push a per-receiver payload to every connected receiver.
    ///
    /// The payload function is evaluated once per target, sequentially, in
    /// the order of the id snapshot taken at call time.
    pub async fn send_to_all_with<D: Serialize>(
        &self,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
    ) -> Result<(), CarrierError> {
        for id in self.registry.all_ids() {
            let payload = serde_json::to_string(&data_for(&id))?;
            self.transport.send_to(&id, kind, &payload).await?;
        }
        Ok(())
    }

    /// Push a message to every connected receiver except one.
    pub async fn send_to_all_except<D: Serialize>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data: &D,
    ) -> Result<(), CarrierError> {
        let payload = serde_json::to_string(data)?;
        tracing::debug!(except = %except, "send_to_all_except");
        self.transport.send_to_all_except(except, kind, &payload).await?;
        Ok(())
    }

    /// Push a per-receiver payload to every connected receiver except one.
    pub async fn send_to_all_except_with<D: Serialize>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
    ) -> Result<(), CarrierError> {
        for id in self.targets_except(except) {
            let payload = serde_json::to_string(&data_for(&id))?;
            self.transport.send_to(&id, kind, &payload).await?;
        }
        Ok(())
    }

    // ── Ack waits ──────────────────────────────────────────────────────

    /// Push to a single receiver, then wait for its ack.
    ///
    /// `true` iff [`ack`](Self::ack) is invoked for the id before the
    /// deadline (`timeout`, default [`DEFAULT_AWAIT_TIMEOUT`]). A timeout
    /// is a normal outcome, not an error; only the send itself can fail.
    pub async fn send_to_and_await_ack<D: Serialize>(
        &self,
        id: &ReceiverId,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<bool, CarrierError> {
        self.send_to(id, kind, data).await?;
        let rx = self.registry.resolve(id).arm_ack();
        Ok(wait::await_ack(rx, self.deadline(timeout)).await)
    }

    /// Push to all receivers, then wait for every ack.
    ///
    /// `true` iff **every** receiver in the send snapshot acks before the
    /// shared deadline; partial success is reported as `false`.
    pub async fn send_to_all_and_await_ack<D: Serialize>(
        &self,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<bool, CarrierError> {
        let targets = self.registry.all_ids();
        self.send_to_all(kind, data).await?;
        let slots = self.arm_acks(&targets);
        Ok(wait::await_all_acks(slots, self.deadline(timeout)).await)
    }

    /// Per-receiver-payload variant of
    /// [`send_to_all_and_await_ack`](Self::send_to_all_and_await_ack).
    pub async fn send_to_all_and_await_ack_with<D: Serialize>(
        &self,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
        timeout: Option<Duration>,
    ) -> Result<bool, CarrierError> {
        let targets = self.registry.all_ids();
        for id in &targets {
            let payload = serde_json::to_string(&data_for(id))?;
            self.transport.send_to(id, kind, &payload).await?;
        }
        let slots = self.arm_acks(&targets);
        Ok(wait::await_all_acks(slots, self.deadline(timeout)).await)
    }

    /// Push to all receivers except one, then wait for every ack.
    pub async fn send_to_all_except_and_await_ack<D: Serialize>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<bool, CarrierError> {
        let targets = self.targets_except(except);
        self.send_to_all_except(except, kind, data).await?;
        let slots = self.arm_acks(&targets);
        Ok(wait::await_all_acks(slots, self.deadline(timeout)).await)
    }

    /// Per-receiver-payload variant of
    /// [`send_to_all_except_and_await_ack`](Self::send_to_all_except_and_await_ack).
    pub async fn send_to_all_except_and_await_ack_with<D: Serialize>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
        timeout: Option<Duration>,
    ) -> Result<bool, CarrierError> {
        let targets = self.targets_except(except);
        for id in &targets {
            let payload = serde_json::to_string(&data_for(id))?;
            self.transport.send_to(id, kind, &payload).await?;
        }
        let slots = self.arm_acks(&targets);
        Ok(wait::await_all_acks(slots, self.deadline(timeout)).await)
    }

    // ── Answer waits ───────────────────────────────────────────────────

    /// Push to a single receiver, then wait for its typed answer.
    ///
    /// `Some(decoded)` iff [`answer`](Self::answer) delivers a payload
    /// decodable as `A` before the deadline; `None` on timeout or decode
    /// failure.
    pub async fn send_to_and_await_answer<D: Serialize, A: DeserializeOwned>(
        &self,
        id: &ReceiverId,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<Option<A>, CarrierError> {
        self.send_to(id, kind, data).await?;
        let rx = self.registry.resolve(id).arm_answer();
        Ok(wait::await_answer(id, rx, self.deadline(timeout)).await)
    }

    /// Push to all receivers, then collect their typed answers.
    ///
    /// The result maps exactly the receivers whose decodable answer arrived
    /// before the shared deadline; the rest are absent. The wait itself
    /// never fails — only the send can.
    pub async fn send_to_all_and_await_answer<D: Serialize, A: DeserializeOwned>(
        &self,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<HashMap<ReceiverId, A>, CarrierError> {
        let targets = self.registry.all_ids();
        self.send_to_all(kind, data).await?;
        let slots = self.arm_answers(&targets);
        Ok(wait::await_all_answers(slots, self.deadline(timeout)).await)
    }

    /// Per-receiver-payload variant of
    /// [`send_to_all_and_await_answer`](Self::send_to_all_and_await_answer).
    pub async fn send_to_all_and_await_answer_with<D: Serialize, A: DeserializeOwned>(
        &self,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
        timeout: Option<Duration>,
    ) -> Result<HashMap<ReceiverId, A>, CarrierError> {
        let targets = self.registry.all_ids();
        for id in &targets {
            let payload = serde_json::to_string(&data_for(id))?;
            self.transport.send_to(id, kind, &payload).await?;
        }
        let slots = self.arm_answers(&targets);
        Ok(wait::await_all_answers(slots, self.deadline(timeout)).await)
    }

    /// Push to all receivers except one, then collect their typed answers.
    pub async fn send_to_all_except_and_await_answer<D: Serialize, A: DeserializeOwned>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data: &D,
        timeout: Option<Duration>,
    ) -> Result<HashMap<ReceiverId, A>, CarrierError> {
        let targets = self.targets_except(except);
        self.send_to_all_except(except, kind, data).await?;
        let slots = self.arm_answers(&targets);
        Ok(wait::await_all_answers(slots, self.deadline(timeout)).await)
    }

    /// Per-receiver-payload variant of
    /// [`send_to_all_except_and_await_answer`](Self::send_to_all_except_and_await_answer).
    pub async fn send_to_all_except_and_await_answer_with<D: Serialize, A: DeserializeOwned>(
        &self,
        except: &ReceiverId,
        kind: &M,
        data_for: impl Fn(&ReceiverId) -> D,
        timeout: Option<Duration>,
    ) -> Result<HashMap<ReceiverId, A>, CarrierError> {
        let targets = self.targets_except(except);
        for id in &targets {
            let payload = serde_json::to_string(&data_for(id))?;
            self.transport.send_to(id, kind, &payload).await?;
        }
        let slots = self.arm_answers(&targets);
        Ok(wait::await_all_answers(slots, self.deadline(timeout)).await)
    }

    // ── Response injection ─────────────────────────────────────────────

    /// Deliver an acknowledgment from a receiver.
    ///
    /// Fire-and-forget: unknown ids, ids with no wait outstanding, and
    /// duplicate acks are all harmless no-ops.
    pub fn ack(&self, id: &ReceiverId) {
        tracing::debug!(receiver = %id, "ack");
        self.registry.resolve(id).deliver_ack();
    }

    /// Deliver a raw answer payload from a receiver.
    ///
    /// Fire-and-forget, like [`ack`](Self::ack). Decoding happens on the
    /// waiting side; undecodable payloads are dropped there.
    pub fn answer(&self, id: &ReceiverId, raw: impl Into<String>) {
        tracing::debug!(receiver = %id, "answer");
        self.registry.resolve(id).deliver_answer(raw.into());
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn deadline(&self, timeout: Option<Duration>) -> Instant {
        Instant::now() + timeout.unwrap_or(self.default_timeout)
    }

    fn targets_except(&self, except: &ReceiverId) -> Vec<ReceiverId> {
        self.registry
            .all_ids()
            .into_iter()
            .filter(|id| id != except)
            .collect()
    }

    fn arm_acks(&self, targets: &[ReceiverId]) -> Vec<(ReceiverId, oneshot::Receiver<()>)> {
        targets
            .iter()
            .map(|id| (id.clone(), self.registry.resolve(id).arm_ack()))
            .collect()
    }

    fn arm_answers(&self, targets: &[ReceiverId]) -> Vec<(ReceiverId, oneshot::Receiver<String>)> {
        targets
            .iter()
            .map(|id| (id.clone(), self.registry.resolve(id).arm_answer()))
            .collect()
    }
}

/// Builder for [`Carrier`] with fluent configuration.
///
/// # Example
///
/// ```rust,ignore
/// let carrier = Carrier::builder()
///     .transport(transport)
///     .default_timeout(Duration::from_secs(2))
///     .build()?;
/// ```
pub struct CarrierBuilder<M, T> {
    transport: Option<T>,
    default_timeout: Duration,
    _kind: PhantomData<fn() -> M>,
}

impl<M, T> CarrierBuilder<M, T>
where
    M: Send + Sync,
    T: CarrierTransport<M>,
{
    /// Create a builder with no transport and the default timeout.
    pub fn new() -> Self {
        Self {
            transport: None,
            default_timeout: DEFAULT_AWAIT_TIMEOUT,
            _kind: PhantomData,
        }
    }

    /// Set the push transport (required).
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the default await timeout.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Build the carrier.
    ///
    /// # Errors
    ///
    /// [`CarrierError::InvalidConfiguration`] if no transport was set.
    pub fn build(self) -> Result<Carrier<M, T>, CarrierError> {
        let transport = self.transport.ok_or_else(|| {
            CarrierError::InvalidConfiguration("transport is required".to_string())
        })?;
        Ok(Carrier {
            registry: Arc::new(ReceiverRegistry::new()),
            transport,
            default_timeout: self.default_timeout,
            _kind: PhantomData,
        })
    }
}

impl<M, T> Default for CarrierBuilder<M, T>
where
    M: Send + Sync,
    T: CarrierTransport<M>,
{
    fn default() -> Self {
        Self::new()
    }
}
