use rdkafka::ClientConfig;

use crate::config::KafkaConfig;

pub mod consumer_factory;
pub mod reply;
pub mod transaction;

pub use consumer_factory::KafkaConsumerFactory;
pub use reply::KafkaReplyTemplate;
pub use transaction::KafkaTransactionManager;

/// Client settings shared by every producer the listener sends through.
pub(crate) fn producer_config(config: &KafkaConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_hosts)
        .set("linger.ms", config.kafka_producer_linger_ms.to_string())
        .set(
            "message.timeout.ms",
            config.kafka_message_timeout_ms.to_string(),
        )
        .set(
            "compression.codec",
            config.kafka_compression_codec.to_owned(),
        )
        .set(
            "queue.buffering.max.kbytes",
            queue_kbytes(config.kafka_producer_queue_mib).to_string(),
        )
        .set(
            "queue.buffering.max.messages",
            config.kafka_producer_queue_messages.to_string(),
        );

    if config.kafka_tls {
        client_config
            .set("security.protocol", "ssl")
            .set("enable.ssl.certificate.verification", "false");
    };

    client_config
}

fn queue_kbytes(queue_mib: u32) -> u64 {
    u64::from(queue_mib) * 1024
}

#[cfg(test)]
pub(crate) fn test_kafka_config(hosts: &str) -> KafkaConfig {
    KafkaConfig {
        kafka_producer_linger_ms: 0,
        kafka_producer_queue_mib: 50,
        kafka_producer_queue_messages: 1000,
        kafka_message_timeout_ms: 5000,
        kafka_compression_codec: "none".to_string(),
        kafka_tls: false,
        kafka_hosts: hosts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_config() {
        let mut config = test_kafka_config("kafka:9092");
        config.kafka_producer_queue_mib = u32::MAX;
        let client_config = producer_config(&config);

        assert_eq!(
            client_config.get("queue.buffering.max.kbytes"),
            Some("4398046510080")
        );
        assert_eq!(client_config.get("statistics.interval.ms"), None);
        assert_eq!(client_config.get("linger.ms"), Some("0"));
    }
}
