//! # Carrier
//!
//! Typed server-push messaging with ack/answer correlation.
//!
//! A server pushes typed messages to one, many, or all currently-connected
//! remote endpoints ("receivers"), and can wait — with a bounded timeout —
//! for each addressed receiver to acknowledge receipt or return a typed
//! answer. The push transport itself (a WebSocket hub, an in-process
//! loopback, ...) is a collaborator behind the [`CarrierTransport`] trait;
//! this crate is the correlation and fan-out engine on top of it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Carrier (dispatch facade)                                   │
//! │   send_to / send_to_all / send_to_all_except                │
//! │   ...and_await_ack / ...and_await_answer                    │
//! │   ack(id) / answer(id, raw)                                 │
//! ├──────────────────────────┬──────────────────────────────────┤
//! │ ReceiverRegistry         │ wait coordinator                 │
//! │  id → ReceiverState      │  races completion slots against  │
//! │  (ack + answer slots)    │  one shared deadline per wait    │
//! ├──────────────────────────┴──────────────────────────────────┤
//! │ CarrierTransport (trait) — the external push transport      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics
//!
//! - Unknown receiver ids are never errors: they resolve to an inert
//!   placeholder, so sends and response injections stay fire-and-forget.
//! - Completion slots deliver at most once; duplicate acks/answers are
//!   no-ops. Arming a new wait on a busy slot supersedes the old wait
//!   (last-armed-wins), which then times out at its own deadline.
//! - Multi-target answer waits return a partial map: receivers that time
//!   out or answer garbage are simply absent. Timeouts are outcomes, not
//!   errors; only transport/serialization failures propagate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use carrier::{Carrier, InMemoryTransport};
//!
//! #[derive(Clone, serde::Serialize)]
//! enum Kind { Refresh }
//!
//! let transport = std::sync::Arc::new(InMemoryTransport::new());
//! let carrier = Carrier::<Kind, _>::new(transport.clone());
//!
//! let inbox = transport.connect("conn-1");
//! carrier.add_receiver("conn-1");
//!
//! let acked = carrier
//!     .send_to_and_await_ack(&"conn-1".into(), &Kind::Refresh, &(), None)
//!     .await?;
//! ```

#![deny(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod receiver;

pub use dispatch::{
    Carrier, CarrierBuilder, CarrierTransport, Delivery, InMemoryTransport, DEFAULT_AWAIT_TIMEOUT,
};
pub use error::{CarrierError, TransportError};
pub use receiver::{
    CompletionSlot, MembershipMonitor, MonitorCallback, ReceiverId, ReceiverRegistry, ReceiverState,
};
