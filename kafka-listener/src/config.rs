use envconfig::Envconfig;

use crate::properties::ListenerProperties;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(nested = true)]
    pub kafka: KafkaConfig,

    #[envconfig(nested = true)]
    pub consumer: ConsumerConfig,

    #[envconfig(nested = true)]
    pub listener: ListenerProperties,

    // Listener replies are only wired in when a reply topic is configured
    pub kafka_reply_topic: Option<String>,

    // Enables transactional delivery when set
    pub kafka_transactional_id: Option<String>,

    #[envconfig(default = "10000")]
    pub kafka_transaction_timeout_ms: u64,
}

/// Broker connection and producer settings for replies and transactions.
#[derive(Envconfig, Clone, Debug)]
pub struct KafkaConfig {
    #[envconfig(default = "20")]
    pub kafka_producer_linger_ms: u32,

    // Reply producer queue, in MiB
    #[envconfig(default = "400")]
    pub kafka_producer_queue_mib: u32,

    #[envconfig(default = "10000000")]
    pub kafka_producer_queue_messages: u32,

    // Also the timeout of a single reply send
    #[envconfig(default = "20000")]
    pub kafka_message_timeout_ms: u32,

    #[envconfig(default = "none")]
    pub kafka_compression_codec: String,

    #[envconfig(default = "false")]
    pub kafka_tls: bool,

    #[envconfig(default = "localhost:9092")]
    pub kafka_hosts: String,
}

#[derive(Envconfig, Clone, Debug)]
pub struct ConsumerConfig {
    #[envconfig(default = "kafka-listener")]
    pub kafka_consumer_group: String,

    #[envconfig(default = "events")]
    pub kafka_consumer_topic: String,

    #[envconfig(default = "earliest")]
    pub kafka_consumer_offset_reset: String,

    // Offsets are committed by the container according to its ack mode, so auto commit
    // stays off unless explicitly asked for.
    #[envconfig(default = "false")]
    pub kafka_consumer_auto_commit: bool,

    #[envconfig(default = "5000")]
    pub kafka_consumer_auto_commit_interval_ms: u32,
}
