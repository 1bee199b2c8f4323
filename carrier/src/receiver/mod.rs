//! Receiver-side state: identities, completion slots, registry, monitor.

mod id;
mod monitor;
mod registry;
mod slot;

pub use id::ReceiverId;
pub use monitor::{MembershipMonitor, MonitorCallback};
pub use registry::{ReceiverRegistry, ReceiverState};
pub use slot::CompletionSlot;
