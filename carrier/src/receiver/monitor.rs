//! Membership observer hook.

use crate::receiver::ReceiverId;

/// Callback invoked with the full current id set on every membership change.
pub type MonitorCallback = Box<dyn Fn(&[ReceiverId]) + Send + Sync + 'static>;

/// Single-slot membership observer.
///
/// Holds at most one callback. Notifications are synchronous and
/// unbuffered: if no observer is registered when a change happens, the
/// notification is dropped.
#[derive(Default)]
pub struct MembershipMonitor {
    callback: Option<MonitorCallback>,
}

impl MembershipMonitor {
    /// Create a monitor with no observer registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the observer callback, replacing any previous one.
    pub fn set(&mut self, callback: MonitorCallback) {
        self.callback = Some(callback);
    }

    /// Remove the observer callback.
    pub fn clear(&mut self) {
        self.callback = None;
    }

    /// Notify the observer of the current membership, if one is registered.
    pub fn notify(&self, ids: &[ReceiverId]) {
        match &self.callback {
            Some(callback) => callback(ids),
            None => tracing::trace!("membership change with no observer, dropping"),
        }
    }
}
