//! Assemble a listener container factory from the environment and create its consumers.
use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;
use eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kafka_listener::config::Config;
use kafka_listener::configurer::ListenerContainerFactoryConfigurer;
use kafka_listener::converter::JsonMessageConverter;
use kafka_listener::error_handler::{LoggingAfterRollbackProcessor, LoggingErrorHandler};
use kafka_listener::factory::ConcurrentListenerContainerFactory;
use kafka_listener::kafka::{KafkaConsumerFactory, KafkaReplyTemplate, KafkaTransactionManager};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::init_from_env().wrap_err("Invalid configuration")?;

    let mut builder = ListenerContainerFactoryConfigurer::builder(config.listener.clone())
        .message_converter(Arc::new(JsonMessageConverter))
        .common_error_handler(Arc::new(LoggingErrorHandler));

    if let Some(topic) = &config.kafka_reply_topic {
        let template = KafkaReplyTemplate::new(&config.kafka, Some(topic.to_owned()))
            .wrap_err("failed to create reply template")?;
        builder = builder.reply_template(Arc::new(template));
    }

    if let Some(transactional_id) = &config.kafka_transactional_id {
        let manager = KafkaTransactionManager::from_config(
            &config.kafka,
            transactional_id,
            Duration::from_millis(config.kafka_transaction_timeout_ms),
        )
        .wrap_err("failed to initialize transactions")?;
        builder = builder
            .transaction_manager(Arc::new(manager))
            .after_rollback_processor(Arc::new(LoggingAfterRollbackProcessor));
    }

    let configurer = builder.build();
    let consumer_factory = Arc::new(KafkaConsumerFactory::new(&config.kafka, &config.consumer));

    let mut factory = ConcurrentListenerContainerFactory::default();
    configurer.configure(&mut factory, consumer_factory);

    let container = factory
        .create_container(&[config.consumer.kafka_consumer_topic.as_str()])
        .wrap_err("failed to create listener container")?;
    let consumers = container
        .create_consumers()
        .wrap_err("failed to create consumers")?;

    info!(
        topics = ?container.topics(),
        consumers = consumers.len(),
        ack_mode = %container.container_properties().ack_mode(),
        batch_listener = container.is_batch_listener(),
        auto_startup = container.is_auto_startup(),
        "listener container ready"
    );

    Ok(())
}
