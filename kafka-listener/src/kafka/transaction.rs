use std::time::Duration;

use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, Producer};
use rdkafka::ClientConfig;
use tracing::{debug, info};

use crate::config::KafkaConfig;
use crate::error::ListenerError;
use crate::kafka::producer_config;
use crate::traits::TransactionManager;

/// Runs listener transactions on a transactional producer. One manager serves one
/// transaction at a time.
pub struct KafkaTransactionManager {
    producer: FutureProducer,
    transactional_id: String,
    timeout: Duration,
}

impl std::fmt::Debug for KafkaTransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaTransactionManager")
            .field("transactional_id", &self.transactional_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn transactional_config(config: &KafkaConfig, transactional_id: &str) -> ClientConfig {
    let mut client_config = producer_config(config);
    client_config.set("transactional.id", transactional_id);
    client_config
}

impl KafkaTransactionManager {
    /// Create the producer and register `transactional_id` with the cluster,
    /// fencing off any previous producer that used it.
    pub fn from_config(
        config: &KafkaConfig,
        transactional_id: &str,
        timeout: Duration,
    ) -> Result<Self, KafkaError> {
        let client_config = transactional_config(config, transactional_id);
        debug!("rdkafka configuration: {:?}", client_config);
        let producer: FutureProducer = client_config.create()?;

        producer.init_transactions(timeout)?;
        info!(transactional_id, "initialized transactional producer");

        Ok(Self {
            producer,
            transactional_id: transactional_id.to_owned(),
            timeout,
        })
    }

    pub fn producer(&self) -> &FutureProducer {
        &self.producer
    }
}

impl TransactionManager for KafkaTransactionManager {
    fn transactional_id(&self) -> &str {
        &self.transactional_id
    }

    fn begin(&self) -> Result<(), ListenerError> {
        self.producer.begin_transaction()?;
        Ok(())
    }

    fn commit(&self) -> Result<(), ListenerError> {
        self.producer.commit_transaction(self.timeout)?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), ListenerError> {
        self.producer.abort_transaction(self.timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::test_kafka_config;

    #[test]
    fn test_transactional_config() {
        let client_config = transactional_config(&test_kafka_config("kafka:9092"), "listener-tx-1");

        assert_eq!(client_config.get("transactional.id"), Some("listener-tx-1"));
        assert_eq!(client_config.get("bootstrap.servers"), Some("kafka:9092"));
        assert_eq!(client_config.get("security.protocol"), None);
    }
}
