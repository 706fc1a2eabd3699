use std::time::Duration;

use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::debug;

use crate::config::KafkaConfig;
use crate::error::ListenerError;
use crate::kafka::producer_config;
use crate::traits::ReplyTemplate;

pub struct KafkaReplyTemplate {
    producer: FutureProducer,
    default_topic: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for KafkaReplyTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaReplyTemplate")
            .field("default_topic", &self.default_topic)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl KafkaReplyTemplate {
    pub fn new(config: &KafkaConfig, default_topic: Option<String>) -> Result<Self, KafkaError> {
        let client_config = producer_config(config);
        debug!("rdkafka configuration: {:?}", client_config);
        let producer: FutureProducer = client_config.create()?;

        Ok(Self {
            producer,
            default_topic,
            timeout: Duration::from_millis(u64::from(config.kafka_message_timeout_ms)),
        })
    }
}

#[async_trait]
impl ReplyTemplate for KafkaReplyTemplate {
    fn default_topic(&self) -> Option<&str> {
        self.default_topic.as_deref()
    }

    async fn send(
        &self,
        topic: Option<&str>,
        key: Option<&[u8]>,
        payload: &[u8],
    ) -> Result<(), ListenerError> {
        let topic = topic
            .or(self.default_topic.as_deref())
            .ok_or(ListenerError::MissingReplyTopic)?;

        let mut record = FutureRecord::<[u8], [u8]>::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        let (partition, offset) = self
            .producer
            .send(record, self.timeout)
            .await
            .map_err(|(error, _)| ListenerError::Kafka(error))?;

        debug!(topic, partition, offset, "sent listener reply");
        Ok(())
    }
}
