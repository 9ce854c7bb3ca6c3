use thingest_types::topic::MeasureTopic;

use crate::{Event, MeasureMessage, MessageError};

/// Turn a raw (topic, payload) publication into an [Event].
///
/// Invalid publications never abort the transport loop; they become
/// [Event::InvalidPublish] carrying the rejection reason and the raw
/// bytes for operator-facing logging.
pub fn topic_and_payload_to_event(topic: &[u8], payload: &[u8]) -> Event {
    let parsed = match MeasureTopic::parse(topic) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Event::InvalidPublish {
                reason: MessageError::Topic(e),
                topic: topic.to_vec(),
                payload: payload.to_vec(),
            }
        }
    };

    let payload_str = match std::str::from_utf8(payload) {
        Ok(s) => s.to_string(),
        Err(_) => {
            return Event::InvalidPublish {
                reason: MessageError::PayloadUtf8,
                topic: topic.to_vec(),
                payload: payload.to_vec(),
            }
        }
    };

    Event::Measure(MeasureMessage {
        topic: parsed,
        payload: payload_str,
    })
}
