//! Part of [thingest], a library for ingesting and normalizing device
//! measures published over a lightweight publish/subscribe transport.
//!
//! This crate defines the traits and types at the boundary between the
//! ingestion core and its external collaborators: the inbound transport
//! event loop, the provisioning registry and the downstream delivery
//! client. The core never manages connections, subscriptions or retries;
//! implementations of these traits do.
//!
//! # Feature Flags
//!
//! - `channel`: Enables the channel based [EventLoop] and [DeliverySink]
//!   implementations. Useful for writing tests where it is not appropriate
//!   to be running a real broker setup. Disabled by default.

mod memory;
mod traits;
mod types;
mod utils;

pub use memory::MemoryStore;
pub use traits::{
    DeliverySink, DynDeliverySink, DynEventLoop, DynProvisioningStore, EventLoop,
    ProvisioningStore,
};
pub use types::*;
pub use utils::topic_and_payload_to_event;

#[cfg(any(feature = "channel", doc))]
pub mod channel;
