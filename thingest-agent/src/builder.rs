use std::sync::Arc;

use thingest_client::{DeliverySink, DynDeliverySink, DynProvisioningStore, EventLoop, ProvisioningStore};
use thingest_types::{constants::DEFAULT_TIMESTAMP_ALIAS, utils::validate_name};

use crate::{
    agent::{Agent, Shared},
    BuildError,
};

const DEFAULT_WORKER_CAPACITY: usize = 16;

/// A builder for creating and configuring [Agent] instances.
pub struct AgentBuilder<E> {
    eventloop: E,
    store: Arc<DynProvisioningStore>,
    sink: Arc<DynDeliverySink>,
    timestamp_alias: String,
    worker_capacity: usize,
}

impl<E: EventLoop> AgentBuilder<E> {
    /// Creates a new builder from the transport event loop and the two
    /// consumed collaborators.
    pub fn new<P, D>(eventloop: E, store: P, sink: D) -> Self
    where
        P: ProvisioningStore + Send + Sync + 'static,
        D: DeliverySink + Send + Sync + 'static,
    {
        Self {
            eventloop,
            store: Arc::new(store),
            sink: Arc::new(sink),
            timestamp_alias: DEFAULT_TIMESTAMP_ALIAS.to_string(),
            worker_capacity: DEFAULT_WORKER_CAPACITY,
        }
    }

    /// Sets the reserved raw key that carries the device-local timestamp.
    pub fn with_timestamp_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.timestamp_alias = alias.into();
        self
    }

    /// Sets the per-device worker queue depth. A full queue
    /// back-pressures the ingestion loop.
    pub fn with_worker_capacity(mut self, capacity: usize) -> Self {
        self.worker_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Agent<E>, BuildError> {
        if validate_name(&self.timestamp_alias).is_err() {
            return Err(BuildError::InvalidTimestampAlias(self.timestamp_alias));
        }
        if self.worker_capacity == 0 {
            return Err(BuildError::ZeroWorkerCapacity);
        }
        Ok(Agent::new(
            self.eventloop,
            Shared {
                store: self.store,
                sink: self.sink,
                timestamp_alias: self.timestamp_alias,
            },
            self.worker_capacity,
        ))
    }
}
