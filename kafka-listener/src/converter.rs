use crate::error::ListenerError;
use crate::record::ConsumerRecord;
use crate::traits::{ListenerMessage, MessageConverter};

/// Parses record payloads as JSON. Keys are decoded as UTF-8, lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMessageConverter;

impl MessageConverter for JsonMessageConverter {
    fn to_message(&self, record: &ConsumerRecord) -> Result<ListenerMessage, ListenerError> {
        let Some(payload) = record.payload.as_deref() else {
            return Err(ListenerError::Empty);
        };

        Ok(ListenerMessage {
            topic: record.topic.clone(),
            partition: record.partition,
            offset: record.offset,
            key: record
                .key
                .as_deref()
                .map(|key| String::from_utf8_lossy(key).into_owned()),
            payload: serde_json::from_slice(payload)?,
        })
    }
}
