use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thingest_agent::AgentBuilder;
use thingest_client::{
    channel::{ChannelBroker, ChannelEventLoop, ChannelSink},
    topic_and_payload_to_event, DeliveryError, DeliverySink, MemoryStore,
};
use thingest_types::{
    AttributeMapping, AttributeValue, DeviceProvisioningRecord, UpdateBatch,
};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

fn provision(store: &MemoryStore, apikey: &str, device_id: &str, mappings: Vec<AttributeMapping>, modules: Vec<&str>) {
    store
        .provision(DeviceProvisioningRecord {
            device_id: device_id.to_string(),
            apikey: apikey.to_string(),
            service: "smartGondor".to_string(),
            service_path: "/gardens".to_string(),
            attributes: mappings,
            modules: modules.into_iter().map(|m| m.to_string()).collect(),
        })
        .unwrap();
}

fn start_agent(store: MemoryStore) -> (ChannelBroker, mpsc::UnboundedReceiver<UpdateBatch>) {
    let (eventloop, broker) = ChannelEventLoop::new();
    let (sink, rx_batches) = ChannelSink::new();
    let mut agent = AgentBuilder::new(eventloop, store, sink).build().unwrap();
    tokio::spawn(async move { agent.run().await });
    (broker, rx_batches)
}

fn publish(broker: &ChannelBroker, topic: &str, payload: &str) {
    broker
        .tx_event
        .send(topic_and_payload_to_event(topic.as_bytes(), payload.as_bytes()))
        .unwrap();
}

async fn next_batch(rx: &mut mpsc::UnboundedReceiver<UpdateBatch>) -> UpdateBatch {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

fn attribute<'a>(batch: &'a UpdateBatch, name: &str) -> &'a AttributeValue {
    &batch
        .attributes
        .iter()
        .find(|a| a.name == name)
        .unwrap_or_else(|| panic!("batch has no attribute {name}"))
        .value
}

#[tokio::test]
async fn key_value_measure_is_normalized() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![
            AttributeMapping::new("humidity", "humidity", "Number"),
            AttributeMapping::new("t", "temperature", "Number"),
        ],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(&broker, "/1234/MQTT_2/attrs", r#"{"humidity":"32","t":"87"}"#);

    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.device_id, "MQTT_2");
    assert_eq!(batch.service, "smartGondor");
    assert_eq!(batch.service_path, "/gardens");
    assert_eq!(batch.attributes.len(), 2);
    assert_eq!(batch.attributes[0].name, "humidity");
    assert_eq!(batch.attributes[1].name, "temperature");
    assert_eq!(attribute(&batch, "temperature"), &AttributeValue::Number(87.0));
    assert!(batch.metadata.is_none());
}

#[tokio::test]
async fn timestamp_alias_becomes_batch_metadata() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![
            AttributeMapping::new("humidity", "humidity", "Number"),
            AttributeMapping::new("temperature", "temperature", "Number"),
        ],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(
        &broker,
        "/1234/MQTT_2/attrs",
        r#"{"humidity":"32","temperature":"87","tt":"20071103T131805"}"#,
    );

    let batch = next_batch(&mut rx).await;
    let names: Vec<&str> = batch.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["humidity", "temperature"]);
    let timestamp = batch.metadata.unwrap().timestamp;
    assert_eq!(timestamp.to_string(), "2007-11-03 13:18:05");
}

#[tokio::test]
async fn invalid_timestamp_is_excluded_but_non_fatal() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(
        &broker,
        "/1234/MQTT_2/attrs",
        r#"{"humidity":"32","tt":"garbage"}"#,
    );

    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.attributes.len(), 1);
    assert_eq!(batch.attributes[0].name, "humidity");
    assert!(batch.metadata.is_none());
}

#[tokio::test]
async fn module_multi_and_single_topics_are_equivalent() {
    let p1_mappings = || {
        vec![
            AttributeMapping::new("P1_mcc", "mcc", "Number"),
            AttributeMapping::new("P1_mnc", "mnc", "Number"),
            AttributeMapping::new("P1_lac", "lac", "String"),
            AttributeMapping::new("P1_cell_id", "cellId", "String"),
            AttributeMapping::new("P1_dbm", "dbm", "Number"),
        ]
    };

    let store = MemoryStore::new();
    provision(&store, "1234", "MQTT_2", p1_mappings(), vec!["P1"]);
    let (broker, mut rx) = start_agent(store);

    publish(&broker, "/1234/MQTT_2/attrs", r#"{"P1":"214,7,d22,b00,-64,"}"#);
    let multi = next_batch(&mut rx).await;

    publish(&broker, "/1234/MQTT_2/attrs/P1", "214,7,d22,b00,-64,");
    let single = next_batch(&mut rx).await;

    assert_eq!(multi.attributes, single.attributes);
    assert_eq!(attribute(&multi, "mcc"), &AttributeValue::Number(214.0));
    assert_eq!(attribute(&multi, "lac"), &AttributeValue::Text("d22".into()));
    assert_eq!(attribute(&multi, "dbm"), &AttributeValue::Number(-64.0));
}

#[tokio::test]
async fn packed_hex_module_decodes_and_length_mismatch_delivers_nothing() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![
            AttributeMapping::new("C1_mcc", "mcc", "Number"),
            AttributeMapping::new("C1_mnc", "mnc", "Number"),
            AttributeMapping::new("C1_lac", "lac", "String"),
            AttributeMapping::new("C1_cell_id", "cellId", "String"),
            AttributeMapping::new("humidity", "humidity", "Number"),
        ],
        vec!["C1"],
    );
    let (broker, mut rx) = start_agent(store);

    /* One hex digit short: the whole message is discarded, even the valid sibling */
    publish(
        &broker,
        "/1234/MQTT_2/attrs",
        r#"{"humidity":"32","C1":"00D600070d220b0"}"#,
    );
    /* A valid message afterwards proves the pipeline is unaffected */
    publish(&broker, "/1234/MQTT_2/attrs/C1", "00D600070d220b00");

    let batch = next_batch(&mut rx).await;
    assert_eq!(attribute(&batch, "mcc"), &AttributeValue::Number(214.0));
    assert_eq!(attribute(&batch, "mnc"), &AttributeValue::Number(7.0));
    assert_eq!(attribute(&batch, "lac"), &AttributeValue::Text("0d22".into()));
    assert_eq!(attribute(&batch, "cellId"), &AttributeValue::Text("0b00".into()));
    assert!(batch.attributes.iter().all(|a| a.name != "humidity"));
}

#[tokio::test]
async fn token_list_variants_share_their_prefix() {
    let b_mappings = vec![
        AttributeMapping::new("B_voltage", "voltage", "Number"),
        AttributeMapping::new("B_state", "state", "Number"),
        AttributeMapping::new("B_charger", "charger", "Number"),
        AttributeMapping::new("B_charging", "charging", "Number"),
        AttributeMapping::new("B_mode", "mode", "Number"),
        AttributeMapping::new("B_disconnection", "disconnection", "Number"),
        AttributeMapping::new("B_battery_level", "batteryLevel", "Number"),
        AttributeMapping::new("B_temperature", "temperature", "Number"),
    ];

    let store = MemoryStore::new();
    provision(&store, "1234", "MQTT_2", b_mappings, vec!["B"]);
    let (broker, mut rx) = start_agent(store);

    publish(&broker, "/1234/MQTT_2/attrs", r#"{"B":"4.70,1,1,1,1,0"}"#);
    let short = next_batch(&mut rx).await;

    publish(&broker, "/1234/MQTT_2/attrs", r#"{"B":"4.70,1,1,1,1,0,9,18"}"#);
    let long = next_batch(&mut rx).await;

    assert_eq!(short.attributes.len(), 6);
    assert_eq!(long.attributes.len(), 8);
    assert_eq!(&long.attributes[..6], &short.attributes[..]);
    assert_eq!(attribute(&long, "batteryLevel"), &AttributeValue::Number(9.0));
    assert_eq!(attribute(&long, "temperature"), &AttributeValue::Number(18.0));
}

#[tokio::test]
async fn unmapped_raw_keys_never_appear_in_batches() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(
        &broker,
        "/1234/MQTT_2/attrs",
        r#"{"pressure":"1013","humidity":"32","wind":"3"}"#,
    );

    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.attributes.len(), 1);
    assert_eq!(batch.attributes[0].name, "humidity");
}

#[tokio::test]
async fn unprovisioned_device_delivers_nothing() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(&broker, "/1234/UNKNOWN/attrs", r#"{"humidity":"32"}"#);
    publish(&broker, "/1234/MQTT_2/attrs", r#"{"humidity":"32"}"#);

    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.device_id, "MQTT_2");
}

#[tokio::test]
async fn same_device_messages_are_delivered_in_arrival_order() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    for i in 0..32 {
        publish(
            &broker,
            "/1234/MQTT_2/attrs",
            &format!(r#"{{"humidity":"{i}"}}"#),
        );
    }

    for i in 0..32 {
        let batch = next_batch(&mut rx).await;
        assert_eq!(attribute(&batch, "humidity"), &AttributeValue::Number(i as f64));
    }
}

struct GatedSink {
    inner: ChannelSink,
    gate: Arc<Semaphore>,
    gated_device: String,
}

#[async_trait]
impl DeliverySink for GatedSink {
    async fn deliver(&self, batch: UpdateBatch) -> Result<(), DeliveryError> {
        if batch.device_id == self.gated_device {
            let permit = self.gate.acquire().await.map_err(|_| {
                DeliveryError::Rejected("gate closed".to_string())
            })?;
            permit.forget();
        }
        self.inner.deliver(batch).await
    }
}

#[tokio::test]
async fn distinct_devices_do_not_block_one_another() {
    let store = MemoryStore::new();
    let humidity = vec![AttributeMapping::new("humidity", "humidity", "Number")];
    provision(&store, "1234", "DEV_A", humidity.clone(), vec![]);
    provision(&store, "1234", "DEV_B", humidity, vec![]);

    let gate = Arc::new(Semaphore::new(0));
    let (eventloop, broker) = ChannelEventLoop::new();
    let (inner, mut rx) = ChannelSink::new();
    let sink = GatedSink {
        inner,
        gate: gate.clone(),
        gated_device: "DEV_A".to_string(),
    };
    let mut agent = AgentBuilder::new(eventloop, store, sink).build().unwrap();
    tokio::spawn(async move { agent.run().await });

    /* DEV_A's delivery stalls on the gate; DEV_B must still get through */
    publish(&broker, "/1234/DEV_A/attrs", r#"{"humidity":"1"}"#);
    publish(&broker, "/1234/DEV_B/attrs", r#"{"humidity":"2"}"#);

    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.device_id, "DEV_B");

    gate.add_permits(1);
    let batch = next_batch(&mut rx).await;
    assert_eq!(batch.device_id, "DEV_A");
}

struct FlakySink {
    inner: ChannelSink,
    reject_next: AtomicBool,
}

#[async_trait]
impl DeliverySink for FlakySink {
    async fn deliver(&self, batch: UpdateBatch) -> Result<(), DeliveryError> {
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(DeliveryError::Rejected("downstream unavailable".to_string()));
        }
        self.inner.deliver(batch).await
    }
}

#[tokio::test]
async fn delivery_rejection_is_not_retried_and_does_not_stall_the_device() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );

    let (eventloop, broker) = ChannelEventLoop::new();
    let (inner, mut rx) = ChannelSink::new();
    let sink = FlakySink {
        inner,
        reject_next: AtomicBool::new(true),
    };
    let mut agent = AgentBuilder::new(eventloop, store, sink).build().unwrap();
    tokio::spawn(async move { agent.run().await });

    publish(&broker, "/1234/MQTT_2/attrs", r#"{"humidity":"1"}"#);
    publish(&broker, "/1234/MQTT_2/attrs", r#"{"humidity":"2"}"#);

    /* The rejected batch is gone for good; only the second arrives */
    let batch = next_batch(&mut rx).await;
    assert_eq!(attribute(&batch, "humidity"), &AttributeValue::Number(2.0));
}

#[tokio::test]
async fn malformed_topics_are_ignored() {
    let store = MemoryStore::new();
    provision(
        &store,
        "1234",
        "MQTT_2",
        vec![AttributeMapping::new("humidity", "humidity", "Number")],
        vec![],
    );
    let (broker, mut rx) = start_agent(store);

    publish(&broker, "/1234/MQTT_2", r#"{"humidity":"1"}"#);
    publish(&broker, "/1234/MQTT_2/attrs", r#"{"humidity":"2"}"#);

    let batch = next_batch(&mut rx).await;
    assert_eq!(attribute(&batch, "humidity"), &AttributeValue::Number(2.0));
}
