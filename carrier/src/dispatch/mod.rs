//! Dispatch side: facade, transport seam, wait coordination, decoding.

mod carrier;
mod decode;
mod memory;
mod transport;
mod wait;

pub use carrier::{Carrier, CarrierBuilder, DEFAULT_AWAIT_TIMEOUT};
pub use memory::{Delivery, InMemoryTransport};
pub use transport::CarrierTransport;
