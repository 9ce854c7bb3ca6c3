use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use thingest_client::{
    DeliveryError, DynDeliverySink, DynProvisioningStore, Event, EventLoop, LookupError,
    MeasureMessage,
};
use thingest_codec::decode_payload;

use crate::{assemble::assemble, extract::extract_timestamp, resolve::resolve, Diagnostic};

pub(crate) struct Shared {
    pub(crate) store: Arc<DynProvisioningStore>,
    pub(crate) sink: Arc<DynDeliverySink>,
    pub(crate) timestamp_alias: String,
}

/// The ingestion pipeline.
///
/// `Agent::run` polls the transport event loop and fans messages out to
/// one worker task per device identity. Messages for the same device are
/// processed and delivered strictly in arrival order; unrelated devices
/// proceed fully in parallel. A full worker channel back-pressures the
/// ingestion loop instead of dropping messages.
pub struct Agent<E> {
    eventloop: E,
    shared: Arc<Shared>,
    worker_capacity: usize,
    /// Worker senders live for the process lifetime and are never pruned;
    /// the map is bounded by the number of distinct device identities seen.
    workers: HashMap<(String, String), tokio::sync::mpsc::Sender<MeasureMessage>>,
}

impl<E: EventLoop> Agent<E> {
    pub(crate) fn new(eventloop: E, shared: Shared, worker_capacity: usize) -> Self {
        Self {
            eventloop,
            shared: Arc::new(shared),
            worker_capacity,
            workers: HashMap::new(),
        }
    }

    /// Run the ingestion loop until the event source shuts down.
    pub async fn run(&mut self) {
        info!("Measure ingestion started");
        while let Some(event) = self.eventloop.poll().await {
            match event {
                Event::Online => info!("Transport online"),
                Event::Offline => warn!("Transport offline"),
                Event::InvalidPublish { reason, topic, .. } => Diagnostic::MalformedTopic {
                    topic: String::from_utf8_lossy(&topic).into_owned(),
                    detail: reason.to_string(),
                }
                .report(),
                Event::Measure(message) => self.dispatch(message).await,
            }
        }
        info!("Transport event source closed, measure ingestion stopping");
    }

    async fn dispatch(&mut self, message: MeasureMessage) {
        let key = (
            message.topic.apikey.clone(),
            message.topic.device_id.clone(),
        );
        let tx = self
            .workers
            .entry(key)
            .or_insert_with(|| spawn_device_worker(self.shared.clone(), self.worker_capacity));
        if tx.send(message).await.is_err() {
            error!("Device worker channel closed unexpectedly, message dropped");
        }
    }
}

fn spawn_device_worker(
    shared: Arc<Shared>,
    capacity: usize,
) -> tokio::sync::mpsc::Sender<MeasureMessage> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(capacity);
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            process_message(&shared, message).await;
        }
    });
    tx
}

/// Run one message through the whole pipeline: provisioning lookup,
/// payload decode, timestamp extraction, alias resolution, batch
/// assembly and downstream delivery.
///
/// Structural failures abort the message with nothing delivered;
/// semantic failures drop the offending field and proceed; delivery
/// rejection is reported and never retried.
pub(crate) async fn process_message(shared: &Shared, message: MeasureMessage) {
    let MeasureMessage { topic, payload } = message;

    let record = match shared.store.lookup(&topic.apikey, &topic.device_id).await {
        Ok(record) => record,
        Err(LookupError::NotFound { apikey, device_id }) => {
            Diagnostic::DeviceNotFound { apikey, device_id }.report();
            return;
        }
    };

    let measures = match decode_payload(&payload, &topic.mode, &record) {
        Ok(measures) => measures,
        Err(error) => {
            Diagnostic::Decode {
                device_id: record.device_id.clone(),
                error,
            }
            .report();
            return;
        }
    };

    let extraction = extract_timestamp(&record.device_id, &shared.timestamp_alias, measures);
    if let Some(diagnostic) = &extraction.diagnostic {
        diagnostic.report();
    }

    let resolution = resolve(&record, extraction.measures);
    for diagnostic in &resolution.diagnostics {
        diagnostic.report();
    }

    if resolution.attributes.is_empty() && extraction.metadata.is_none() {
        debug!(
            "No resolvable attributes in measure, nothing to deliver. device={}",
            record.device_id
        );
        return;
    }

    let batch = assemble(&record, resolution.attributes, extraction.metadata);
    if let Err(DeliveryError::Rejected(reason)) = shared.sink.deliver(batch).await {
        Diagnostic::DeliveryRejected {
            device_id: record.device_id,
            reason,
        }
        .report();
    }
}
