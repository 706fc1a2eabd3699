use std::sync::Arc;

use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use tracing::{debug, info, warn};

use crate::container::ContainerProperties;
use crate::error::ContainerError;
use crate::traits::{
    AfterRollbackProcessor, BatchInterceptor, CommonErrorHandler, ConsumerFactory,
    MessageConverter, RecordFilterStrategy, RecordInterceptor, ReplyTemplate,
};

/// The collaborators that sit between a polled record and the listener.
#[derive(Clone, Debug, Default)]
pub struct ListenerAdapters {
    pub message_converter: Option<Arc<dyn MessageConverter>>,
    pub record_filter_strategy: Option<Arc<dyn RecordFilterStrategy>>,
    pub reply_template: Option<Arc<dyn ReplyTemplate>>,
    pub common_error_handler: Option<Arc<dyn CommonErrorHandler>>,
    pub after_rollback_processor: Option<Arc<dyn AfterRollbackProcessor>>,
    pub record_interceptor: Option<Arc<dyn RecordInterceptor>>,
    pub batch_interceptor: Option<Arc<dyn BatchInterceptor>>,
}

/// Creates concurrent listener containers. Anything left unset here falls back to
/// the container defaults when a container is created.
#[derive(Clone, Debug, Default)]
pub struct ConcurrentListenerContainerFactory {
    consumer_factory: Option<Arc<dyn ConsumerFactory>>,
    concurrency: Option<u32>,
    auto_startup: Option<bool>,
    batch_listener: Option<bool>,
    adapters: ListenerAdapters,
    container_properties: ContainerProperties,
}

impl ConcurrentListenerContainerFactory {
    pub fn set_consumer_factory(&mut self, consumer_factory: Arc<dyn ConsumerFactory>) {
        self.consumer_factory = Some(consumer_factory);
    }

    pub fn set_concurrency(&mut self, concurrency: u32) {
        self.concurrency = Some(concurrency);
    }

    pub fn set_auto_startup(&mut self, auto_startup: bool) {
        self.auto_startup = Some(auto_startup);
    }

    pub fn set_batch_listener(&mut self, batch_listener: bool) {
        self.batch_listener = Some(batch_listener);
    }

    pub fn set_message_converter(&mut self, converter: Arc<dyn MessageConverter>) {
        self.adapters.message_converter = Some(converter);
    }

    pub fn set_record_filter_strategy(&mut self, strategy: Arc<dyn RecordFilterStrategy>) {
        self.adapters.record_filter_strategy = Some(strategy);
    }

    pub fn set_reply_template(&mut self, template: Arc<dyn ReplyTemplate>) {
        self.adapters.reply_template = Some(template);
    }

    pub fn set_common_error_handler(&mut self, handler: Arc<dyn CommonErrorHandler>) {
        self.adapters.common_error_handler = Some(handler);
    }

    pub fn set_after_rollback_processor(&mut self, processor: Arc<dyn AfterRollbackProcessor>) {
        self.adapters.after_rollback_processor = Some(processor);
    }

    pub fn set_record_interceptor(&mut self, interceptor: Arc<dyn RecordInterceptor>) {
        self.adapters.record_interceptor = Some(interceptor);
    }

    pub fn set_batch_interceptor(&mut self, interceptor: Arc<dyn BatchInterceptor>) {
        self.adapters.batch_interceptor = Some(interceptor);
    }

    pub fn consumer_factory(&self) -> Option<&Arc<dyn ConsumerFactory>> {
        self.consumer_factory.as_ref()
    }

    pub fn concurrency(&self) -> Option<u32> {
        self.concurrency
    }

    pub fn auto_startup(&self) -> Option<bool> {
        self.auto_startup
    }

    pub fn batch_listener(&self) -> Option<bool> {
        self.batch_listener
    }

    pub fn adapters(&self) -> &ListenerAdapters {
        &self.adapters
    }

    pub fn container_properties(&self) -> &ContainerProperties {
        &self.container_properties
    }

    pub fn container_properties_mut(&mut self) -> &mut ContainerProperties {
        &mut self.container_properties
    }

    /// Snapshot the factory into a container for `topics`. Later changes to the
    /// factory do not affect containers that were already created.
    pub fn create_container(
        &self,
        topics: &[&str],
    ) -> Result<ConcurrentListenerContainer, ContainerError> {
        let consumer_factory = self
            .consumer_factory
            .clone()
            .ok_or(ContainerError::MissingConsumerFactory)?;

        if topics.is_empty() {
            return Err(ContainerError::NoTopics);
        }

        let concurrency = self.concurrency.unwrap_or(1);
        if concurrency == 0 {
            return Err(ContainerError::InvalidConcurrency(concurrency));
        }

        let batch_listener = self.batch_listener.unwrap_or(false);
        let properties = self.container_properties.clone();

        if batch_listener && self.adapters.record_interceptor.is_some() {
            warn!("record interceptor is ignored by a batch listener");
        }
        if !batch_listener && self.adapters.batch_interceptor.is_some() {
            warn!("batch interceptor is ignored by a record listener");
        }

        let children = (0..concurrency)
            .map(|index| ChildContainer {
                index,
                client_id: child_client_id(properties.client_id(), index),
            })
            .collect();

        let container = ConcurrentListenerContainer {
            topics: topics.iter().map(|topic| topic.to_string()).collect(),
            concurrency,
            batch_listener,
            auto_startup: self.auto_startup.unwrap_or(true),
            consumer_factory,
            adapters: self.adapters.clone(),
            properties,
            children,
        };

        if container.properties.is_log_container_config() {
            info!(
                topics = ?container.topics,
                concurrency,
                batch_listener,
                properties = ?container.properties,
                "created listener container"
            );
        } else {
            debug!(topics = ?container.topics, concurrency, "created listener container");
        }

        Ok(container)
    }
}

fn child_client_id(prefix: &str, index: u32) -> Option<String> {
    if prefix.is_empty() {
        None
    } else {
        Some(format!("{prefix}-{index}"))
    }
}

/// One poll loop's share of a concurrent container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildContainer {
    pub index: u32,
    pub client_id: Option<String>,
}

/// A group of child containers sharing the partitions of `topics`.
#[derive(Debug)]
pub struct ConcurrentListenerContainer {
    topics: Vec<String>,
    concurrency: u32,
    batch_listener: bool,
    auto_startup: bool,
    consumer_factory: Arc<dyn ConsumerFactory>,
    adapters: ListenerAdapters,
    properties: ContainerProperties,
    children: Vec<ChildContainer>,
}

impl ConcurrentListenerContainer {
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn concurrency(&self) -> u32 {
        self.concurrency
    }

    pub fn is_batch_listener(&self) -> bool {
        self.batch_listener
    }

    pub fn is_auto_startup(&self) -> bool {
        self.auto_startup
    }

    pub fn consumer_factory(&self) -> &Arc<dyn ConsumerFactory> {
        &self.consumer_factory
    }

    pub fn adapters(&self) -> &ListenerAdapters {
        &self.adapters
    }

    pub fn container_properties(&self) -> &ContainerProperties {
        &self.properties
    }

    pub fn children(&self) -> &[ChildContainer] {
        &self.children
    }

    /// Create and subscribe one consumer per child container.
    pub fn create_consumers(&self) -> Result<Vec<StreamConsumer>, KafkaError> {
        let topics: Vec<&str> = self.topics.iter().map(String::as_str).collect();

        self.children
            .iter()
            .map(|child| {
                let consumer = self
                    .consumer_factory
                    .create_consumer(None, child.client_id.as_deref())?;
                consumer.subscribe(&topics)?;
                debug!(
                    child = child.index,
                    client_id = child.client_id.as_deref().unwrap_or(""),
                    "subscribed child consumer"
                );
                Ok(consumer)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rdkafka::ClientConfig;

    use super::*;

    #[derive(Debug)]
    struct LocalConsumerFactory;

    impl ConsumerFactory for LocalConsumerFactory {
        fn configuration_properties(&self) -> HashMap<String, String> {
            HashMap::from([("group.id".to_owned(), "tests".to_owned())])
        }

        fn create_consumer(
            &self,
            _group_id: Option<&str>,
            _client_id: Option<&str>,
        ) -> Result<StreamConsumer, KafkaError> {
            ClientConfig::new()
                .set("bootstrap.servers", "localhost:9092")
                .set("group.id", "tests")
                .create()
        }
    }

    fn configured_factory() -> ConcurrentListenerContainerFactory {
        let mut factory = ConcurrentListenerContainerFactory::default();
        factory.set_consumer_factory(Arc::new(LocalConsumerFactory));
        factory
    }

    #[test]
    fn test_create_container_requires_consumer_factory() {
        let factory = ConcurrentListenerContainerFactory::default();
        assert_eq!(
            factory.create_container(&["orders"]).unwrap_err(),
            ContainerError::MissingConsumerFactory
        );
    }

    #[test]
    fn test_create_container_requires_topics() {
        assert_eq!(
            configured_factory().create_container(&[]).unwrap_err(),
            ContainerError::NoTopics
        );
    }

    #[test]
    fn test_create_container_rejects_zero_concurrency() {
        let mut factory = configured_factory();
        factory.set_concurrency(0);
        assert_eq!(
            factory.create_container(&["orders"]).unwrap_err(),
            ContainerError::InvalidConcurrency(0)
        );
    }

    #[test]
    fn test_create_container_defaults() {
        let container = configured_factory().create_container(&["orders"]).unwrap();

        assert_eq!(container.topics(), ["orders".to_owned()]);
        assert_eq!(container.concurrency(), 1);
        assert!(!container.is_batch_listener());
        assert!(container.is_auto_startup());
        assert_eq!(
            container.children(),
            [ChildContainer {
                index: 0,
                client_id: None
            }]
        );
    }

    #[test]
    fn test_child_client_ids_are_suffixed() {
        let mut factory = configured_factory();
        factory.set_concurrency(3);
        factory
            .container_properties_mut()
            .set_client_id("billing".to_owned());

        let container = factory.create_container(&["orders", "refunds"]).unwrap();
        let client_ids: Vec<Option<String>> = container
            .children()
            .iter()
            .map(|child| child.client_id.clone())
            .collect();

        assert_eq!(
            client_ids,
            vec![
                Some("billing-0".to_owned()),
                Some("billing-1".to_owned()),
                Some("billing-2".to_owned()),
            ]
        );
    }

    #[test]
    fn test_container_is_a_snapshot() {
        let mut factory = configured_factory();
        factory.container_properties_mut().set_ack_count(10);
        let container = factory.create_container(&["orders"]).unwrap();

        factory.container_properties_mut().set_ack_count(20);
        factory.set_batch_listener(true);

        assert_eq!(container.container_properties().ack_count(), 10);
        assert!(!container.is_batch_listener());
    }
}
