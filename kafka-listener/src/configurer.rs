use std::sync::Arc;

use tracing::debug;

use crate::container::ContainerProperties;
use crate::factory::ConcurrentListenerContainerFactory;
use crate::mapper::PropertyMapper;
use crate::properties::{EnvDuration, EnvSecsDuration, ListenerProperties, ListenerType};
use crate::traits::{
    AfterRollbackProcessor, BatchInterceptor, CommonErrorHandler, ConsumerFactory,
    MessageConverter, RebalanceListener, RecordFilterStrategy, RecordInterceptor, ReplyTemplate,
    TransactionManager,
};

/// Applies [`ListenerProperties`] and any supplied collaborators to a
/// [`ConcurrentListenerContainerFactory`]. The factory can be tuned further afterwards.
#[derive(Clone, Debug)]
pub struct ListenerContainerFactoryConfigurer {
    properties: ListenerProperties,
    message_converter: Option<Arc<dyn MessageConverter>>,
    record_filter_strategy: Option<Arc<dyn RecordFilterStrategy>>,
    reply_template: Option<Arc<dyn ReplyTemplate>>,
    transaction_manager: Option<Arc<dyn TransactionManager>>,
    rebalance_listener: Option<Arc<dyn RebalanceListener>>,
    common_error_handler: Option<Arc<dyn CommonErrorHandler>>,
    after_rollback_processor: Option<Arc<dyn AfterRollbackProcessor>>,
    record_interceptor: Option<Arc<dyn RecordInterceptor>>,
    batch_interceptor: Option<Arc<dyn BatchInterceptor>>,
}

impl ListenerContainerFactoryConfigurer {
    pub fn builder(properties: ListenerProperties) -> ConfigurerBuilder {
        ConfigurerBuilder {
            configurer: ListenerContainerFactoryConfigurer {
                properties,
                message_converter: None,
                record_filter_strategy: None,
                reply_template: None,
                transaction_manager: None,
                rebalance_listener: None,
                common_error_handler: None,
                after_rollback_processor: None,
                record_interceptor: None,
                batch_interceptor: None,
            },
        }
    }

    pub fn properties(&self) -> &ListenerProperties {
        &self.properties
    }

    /// Assign `consumer_factory` to `factory`, then copy every present listener
    /// property and supplied collaborator onto it and its container properties.
    pub fn configure(
        &self,
        factory: &mut ConcurrentListenerContainerFactory,
        consumer_factory: Arc<dyn ConsumerFactory>,
    ) {
        factory.set_consumer_factory(consumer_factory);
        self.configure_listener_factory(factory);
        self.configure_container(factory.container_properties_mut());
    }

    fn configure_listener_factory(&self, factory: &mut ConcurrentListenerContainerFactory) {
        let map = PropertyMapper::new("listener_factory");
        let properties = &self.properties;

        map.from("concurrency", properties.concurrency)
            .to(|v| factory.set_concurrency(v));
        map.from("auto_startup", Some(properties.auto_startup))
            .to(|v| factory.set_auto_startup(v));
        map.from("message_converter", self.message_converter.clone())
            .to(|v| factory.set_message_converter(v));
        map.from("record_filter_strategy", self.record_filter_strategy.clone())
            .to(|v| factory.set_record_filter_strategy(v));
        map.from("reply_template", self.reply_template.clone())
            .to(|v| factory.set_reply_template(v));
        map.from("listener_type", Some(properties.listener_type))
            .when(|t| *t == ListenerType::Batch)
            .to(|_| factory.set_batch_listener(true));
        map.from("common_error_handler", self.common_error_handler.clone())
            .to(|v| factory.set_common_error_handler(v));
        map.from("after_rollback_processor", self.after_rollback_processor.clone())
            .to(|v| factory.set_after_rollback_processor(v));
        map.from("record_interceptor", self.record_interceptor.clone())
            .to(|v| factory.set_record_interceptor(v));
        map.from("batch_interceptor", self.batch_interceptor.clone())
            .to(|v| factory.set_batch_interceptor(v));

        debug!(applied = map.applied(), "configured listener container factory");
    }

    fn configure_container(&self, container: &mut ContainerProperties) {
        let map = PropertyMapper::new("container_properties");
        let properties = &self.properties;

        map.from("ack_mode", properties.ack_mode)
            .to(|v| container.set_ack_mode(v));
        map.from("async_acks", properties.async_acks)
            .to(|v| container.set_async_acks(v));
        map.from("client_id", properties.client_id.clone())
            .to(|v| container.set_client_id(v));
        map.from("ack_count", properties.ack_count)
            .to(|v| container.set_ack_count(v));
        map.from("ack_time", properties.ack_time)
            .map(EnvDuration::to_millis)
            .to(|v| container.set_ack_time(v));
        map.from("poll_timeout", properties.poll_timeout)
            .map(EnvDuration::to_millis)
            .to(|v| container.set_poll_timeout(v));
        map.from("no_poll_threshold", properties.no_poll_threshold)
            .to(|v| container.set_no_poll_threshold(v));
        map.from("idle_between_polls", Some(properties.idle_between_polls))
            .map(EnvDuration::to_millis)
            .to(|v| container.set_idle_between_polls(v));
        map.from("idle_event_interval", properties.idle_event_interval)
            .map(EnvDuration::to_millis)
            .to(|v| container.set_idle_event_interval(v));
        map.from(
            "idle_partition_event_interval",
            properties.idle_partition_event_interval,
        )
        .map(EnvDuration::to_millis)
        .to(|v| container.set_idle_partition_event_interval(v));
        map.from("monitor_interval", properties.monitor_interval)
            .map(EnvSecsDuration::to_seconds)
            .to(|v| container.set_monitor_interval(v));
        map.from("log_container_config", properties.log_container_config)
            .to(|v| container.set_log_container_config(v));
        map.from("missing_topics_fatal", Some(properties.missing_topics_fatal))
            .to(|v| container.set_missing_topics_fatal(v));
        map.from("immediate_stop", Some(properties.immediate_stop))
            .to(|v| container.set_stop_immediate(v));
        map.from("transaction_manager", self.transaction_manager.clone())
            .to(|v| container.set_transaction_manager(v));
        map.from("rebalance_listener", self.rebalance_listener.clone())
            .to(|v| container.set_rebalance_listener(v));

        debug!(applied = map.applied(), "configured container properties");
    }
}

pub struct ConfigurerBuilder {
    configurer: ListenerContainerFactoryConfigurer,
}

impl ConfigurerBuilder {
    pub fn message_converter(mut self, converter: Arc<dyn MessageConverter>) -> Self {
        self.configurer.message_converter = Some(converter);
        self
    }

    /// Filter applied to incoming records before they reach the listener.
    pub fn record_filter_strategy(mut self, strategy: Arc<dyn RecordFilterStrategy>) -> Self {
        self.configurer.record_filter_strategy = Some(strategy);
        self
    }

    /// Template used to send listener replies.
    pub fn reply_template(mut self, template: Arc<dyn ReplyTemplate>) -> Self {
        self.configurer.reply_template = Some(template);
        self
    }

    pub fn transaction_manager(mut self, manager: Arc<dyn TransactionManager>) -> Self {
        self.configurer.transaction_manager = Some(manager);
        self
    }

    pub fn rebalance_listener(mut self, listener: Arc<dyn RebalanceListener>) -> Self {
        self.configurer.rebalance_listener = Some(listener);
        self
    }

    pub fn common_error_handler(mut self, handler: Arc<dyn CommonErrorHandler>) -> Self {
        self.configurer.common_error_handler = Some(handler);
        self
    }

    pub fn after_rollback_processor(mut self, processor: Arc<dyn AfterRollbackProcessor>) -> Self {
        self.configurer.after_rollback_processor = Some(processor);
        self
    }

    pub fn record_interceptor(mut self, interceptor: Arc<dyn RecordInterceptor>) -> Self {
        self.configurer.record_interceptor = Some(interceptor);
        self
    }

    pub fn batch_interceptor(mut self, interceptor: Arc<dyn BatchInterceptor>) -> Self {
        self.configurer.batch_interceptor = Some(interceptor);
        self
    }

    pub fn build(self) -> ListenerContainerFactoryConfigurer {
        self.configurer
    }
}
