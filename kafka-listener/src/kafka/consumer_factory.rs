use std::collections::HashMap;

use rdkafka::consumer::StreamConsumer;
use rdkafka::error::KafkaError;
use rdkafka::ClientConfig;
use tracing::debug;

use crate::config::{ConsumerConfig, KafkaConfig};
use crate::traits::ConsumerFactory;

/// Creates `StreamConsumer`s for the configured cluster and consumer group.
#[derive(Debug, Clone)]
pub struct KafkaConsumerFactory {
    properties: HashMap<String, String>,
}

impl KafkaConsumerFactory {
    pub fn new(common_config: &KafkaConfig, consumer_config: &ConsumerConfig) -> Self {
        let mut factory = Self {
            properties: HashMap::new(),
        };

        factory
            .insert("bootstrap.servers", &common_config.kafka_hosts)
            .insert("statistics.interval.ms", "10000")
            .insert("group.id", &consumer_config.kafka_consumer_group)
            .insert(
                "auto.offset.reset",
                &consumer_config.kafka_consumer_offset_reset,
            )
            .insert(
                "enable.auto.commit",
                &consumer_config.kafka_consumer_auto_commit.to_string(),
            )
            .insert(
                "auto.commit.interval.ms",
                &consumer_config
                    .kafka_consumer_auto_commit_interval_ms
                    .to_string(),
            )
            // Offsets are stored by the container once a record has been acknowledged
            .insert("enable.auto.offset.store", "false");

        if common_config.kafka_tls {
            factory
                .insert("security.protocol", "ssl")
                .insert("enable.ssl.certificate.verification", "false");
        }

        factory
    }

    /// Add or override a client property.
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    fn insert(&mut self, key: &str, value: &str) -> &mut Self {
        self.properties.insert(key.to_owned(), value.to_owned());
        self
    }

    fn client_config(&self, group_id: Option<&str>, client_id: Option<&str>) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        for (key, value) in &self.properties {
            client_config.set(key, value);
        }

        if let Some(group_id) = group_id {
            client_config.set("group.id", group_id);
        }
        if let Some(client_id) = client_id {
            client_config.set("client.id", client_id);
        }

        client_config
    }
}

impl ConsumerFactory for KafkaConsumerFactory {
    fn configuration_properties(&self) -> HashMap<String, String> {
        self.properties.clone()
    }

    fn create_consumer(
        &self,
        group_id: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<StreamConsumer, KafkaError> {
        let client_config = self.client_config(group_id, client_id);
        debug!("rdkafka configuration: {:?}", client_config);

        let consumer: StreamConsumer = client_config.create()?;
        Ok(consumer)
    }
}
