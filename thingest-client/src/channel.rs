use async_trait::async_trait;
use thingest_types::UpdateBatch;
use tokio::sync::mpsc;

use crate::{DeliveryError, DeliverySink, Event, EventLoop};

/// An [EventLoop](crate::EventLoop) implementation that uses channels.
///
/// # Examples
///
/// See [ChannelBroker]
pub struct ChannelEventLoop {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl ChannelEventLoop {
    /// Creates a new event loop along with the corresponding broker.
    pub fn new() -> (Self, ChannelBroker) {
        let (tx_event, rx_event) = mpsc::unbounded_channel();
        (Self { rx: rx_event }, ChannelBroker { tx_event })
    }
}

#[async_trait]
impl EventLoop for ChannelEventLoop {
    async fn poll(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// A "broker" that feeds events into a [ChannelEventLoop].
///
/// # Examples
///
/// ```no_run
/// use thingest_client::{Event, channel::ChannelEventLoop};
/// use tokio::runtime::Runtime;
///
/// let rt = Runtime::new().unwrap();
/// rt.block_on(async {
///     let (mut eventloop, broker) = ChannelEventLoop::new();
///
///     //create an agent that uses the EventLoop
///
///     //Send an event to the EventLoop
///     broker.tx_event.send(Event::Online).unwrap();
/// });
/// ```
pub struct ChannelBroker {
    pub tx_event: mpsc::UnboundedSender<Event>,
}

/// A [DeliverySink](crate::DeliverySink) implementation that forwards
/// every batch over a channel.
///
/// Dropping the receiving end makes subsequent deliveries fail with
/// [DeliveryError::Rejected], which is useful for exercising rejection
/// paths in tests.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UpdateBatch>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UpdateBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DeliverySink for ChannelSink {
    async fn deliver(&self, batch: UpdateBatch) -> Result<(), DeliveryError> {
        self.tx
            .send(batch)
            .map_err(|_| DeliveryError::Rejected("delivery channel closed".to_string()))
    }
}
