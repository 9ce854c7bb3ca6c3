use async_trait::async_trait;
use thingest_types::{DeviceProvisioningRecord, UpdateBatch};

use crate::{DeliveryError, Event, LookupError};

/// Source of inbound transport events.
///
/// Connection management, subscriptions, credentials and reconnection are
/// the implementation's responsibility; the ingestion core only polls.
#[async_trait]
pub trait EventLoop {
    /// Wait for the next event. Returns `None` when the transport has
    /// shut down and no further events will be produced.
    async fn poll(&mut self) -> Option<Event>;
}

pub type DynEventLoop = dyn EventLoop + Send;

/// Read access to the externally owned device provisioning registry.
///
/// Records may be read concurrently by many device pipelines; the core
/// never mutates them.
#[async_trait]
pub trait ProvisioningStore {
    async fn lookup(
        &self,
        apikey: &str,
        device_id: &str,
    ) -> Result<DeviceProvisioningRecord, LookupError>;
}

pub type DynProvisioningStore = dyn ProvisioningStore + Send + Sync;

/// The downstream delivery collaborator (typically a context-broker
/// client).
///
/// The call may block or apply backpressure; callers must propagate that
/// rather than dropping batches. Retrying a rejected batch is not the
/// core's responsibility.
#[async_trait]
pub trait DeliverySink {
    async fn deliver(&self, batch: UpdateBatch) -> Result<(), DeliveryError>;
}

pub type DynDeliverySink = dyn DeliverySink + Send + Sync;
