use rdkafka::error::KafkaError;
use thiserror::Error;

/// Errors raised while turning a configured factory into a container.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContainerError {
    #[error("no consumer factory has been assigned to the listener container factory")]
    MissingConsumerFactory,
    #[error("container concurrency must be at least 1, got {0}")]
    InvalidConcurrency(u32),
    #[error("a listener container needs at least one topic")]
    NoTopics,
}

/// Errors surfaced by the collaborators a listener container delegates to.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Received empty payload")]
    Empty,
    #[error("no reply topic was given and the template has no default topic")]
    MissingReplyTopic,
}
