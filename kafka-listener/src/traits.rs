//! Seams a listener container delegates to. Each is optional on the factory and is
//! only wired in when it has been supplied to the configurer.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use rdkafka::consumer::StreamConsumer;
use rdkafka::error::KafkaError;

use crate::error::ListenerError;
use crate::record::{ConsumerRecord, TopicPartition};

/// Creates the broker connections used by each child container.
pub trait ConsumerFactory: Send + Sync + fmt::Debug {
    /// The client properties every consumer is created with.
    fn configuration_properties(&self) -> HashMap<String, String>;

    /// Create a consumer, overriding `group.id` and `client.id` when given.
    fn create_consumer(
        &self,
        group_id: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<StreamConsumer, KafkaError>;

    fn is_auto_commit(&self) -> bool {
        // librdkafka commits automatically unless told otherwise
        self.configuration_properties()
            .get("enable.auto.commit")
            .map(|value| value == "true")
            .unwrap_or(true)
    }
}

/// A record converted into what a listener is invoked with.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: serde_json::Value,
}

pub trait MessageConverter: Send + Sync + fmt::Debug {
    fn to_message(&self, record: &ConsumerRecord) -> Result<ListenerMessage, ListenerError>;
}

/// Decides which records never reach the listener.
pub trait RecordFilterStrategy: Send + Sync + fmt::Debug {
    /// Returns true if the record should be discarded.
    fn filter(&self, record: &ConsumerRecord) -> bool;

    fn filter_batch(&self, records: Vec<ConsumerRecord>) -> Vec<ConsumerRecord> {
        records
            .into_iter()
            .filter(|record| !self.filter(record))
            .collect()
    }
}

/// Sends the value a listener returns to a reply topic.
#[async_trait]
pub trait ReplyTemplate: Send + Sync + fmt::Debug {
    fn default_topic(&self) -> Option<&str>;

    /// Send a reply, falling back to the default topic when `topic` is `None`.
    async fn send(
        &self,
        topic: Option<&str>,
        key: Option<&[u8]>,
        payload: &[u8],
    ) -> Result<(), ListenerError>;
}

/// Transaction boundary around a consume-process-produce cycle.
pub trait TransactionManager: Send + Sync + fmt::Debug {
    fn transactional_id(&self) -> &str;

    fn begin(&self) -> Result<(), ListenerError>;

    fn commit(&self) -> Result<(), ListenerError>;

    fn rollback(&self) -> Result<(), ListenerError>;
}

/// Application callbacks around partition assignment changes. All callbacks default
/// to doing nothing.
pub trait RebalanceListener: Send + Sync + fmt::Debug {
    /// Called before offsets of the revoked partitions are committed.
    fn on_partitions_revoked_before_commit(&self, _partitions: &[TopicPartition]) {}

    /// Called once offsets of the revoked partitions have been committed.
    fn on_partitions_revoked_after_commit(&self, _partitions: &[TopicPartition]) {}

    fn on_partitions_assigned(&self, _partitions: &[TopicPartition]) {}

    /// Partitions were taken away without a chance to commit. Treated as a
    /// revocation unless overridden.
    fn on_partitions_lost(&self, partitions: &[TopicPartition]) {
        self.on_partitions_revoked_before_commit(partitions);
        self.on_partitions_revoked_after_commit(partitions);
    }
}

/// Handles errors thrown by the listener.
pub trait CommonErrorHandler: Send + Sync + fmt::Debug {
    /// Returns true if the record was dealt with and the container may move past it.
    fn handle_record(&self, error: &ListenerError, record: &ConsumerRecord) -> bool;

    fn handle_batch(&self, error: &ListenerError, records: &[ConsumerRecord]) {
        for record in records {
            if !self.handle_record(error, record) {
                break;
            }
        }
    }

    /// Whether the offset of a handled record should be committed.
    fn is_ack_after_handle(&self) -> bool {
        true
    }
}

/// Invoked with the unprocessed records after a transaction was rolled back.
pub trait AfterRollbackProcessor: Send + Sync + fmt::Debug {
    fn process(&self, records: &[ConsumerRecord], error: &ListenerError);

    fn is_process_in_transaction(&self) -> bool {
        false
    }
}

/// Sees each record before a record listener does. Returning `None` skips it.
pub trait RecordInterceptor: Send + Sync + fmt::Debug {
    fn intercept(&self, record: ConsumerRecord) -> Option<ConsumerRecord>;

    fn success(&self, _record: &ConsumerRecord) {}

    fn failure(&self, _record: &ConsumerRecord, _error: &ListenerError) {}
}

/// Sees each polled batch before a batch listener does. Returning `None` skips it.
pub trait BatchInterceptor: Send + Sync + fmt::Debug {
    fn intercept(&self, records: Vec<ConsumerRecord>) -> Option<Vec<ConsumerRecord>>;

    fn success(&self, _records: &[ConsumerRecord]) {}

    fn failure(&self, _records: &[ConsumerRecord], _error: &ListenerError) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn record(offset: i64) -> ConsumerRecord {
        ConsumerRecord {
            topic: "orders".to_owned(),
            partition: 0,
            offset,
            key: None,
            payload: Some(b"{}".to_vec()),
            timestamp_ms: None,
        }
    }

    #[derive(Debug)]
    struct OddOffsets;

    impl RecordFilterStrategy for OddOffsets {
        fn filter(&self, record: &ConsumerRecord) -> bool {
            record.offset % 2 == 1
        }
    }

    #[test]
    fn test_filter_batch_drops_filtered_records() {
        let kept = OddOffsets.filter_batch((0..5).map(record).collect());
        let offsets: Vec<i64> = kept.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl RebalanceListener for Recorder {
        fn on_partitions_revoked_before_commit(&self, partitions: &[TopicPartition]) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("before:{}", partitions.len()));
        }

        fn on_partitions_revoked_after_commit(&self, partitions: &[TopicPartition]) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("after:{}", partitions.len()));
        }
    }

    #[test]
    fn test_lost_partitions_are_treated_as_revoked() {
        let listener = Recorder::default();
        listener.on_partitions_lost(&[
            TopicPartition::new("orders", 0),
            TopicPartition::new("orders", 1),
        ]);

        assert_eq!(
            *listener.calls.lock().unwrap(),
            vec!["before:2".to_owned(), "after:2".to_owned()]
        );
    }

    #[derive(Debug, Default)]
    struct Counting {
        seen: Mutex<Vec<i64>>,
    }

    impl CommonErrorHandler for Counting {
        fn handle_record(&self, _error: &ListenerError, record: &ConsumerRecord) -> bool {
            self.seen.lock().unwrap().push(record.offset);
            record.offset < 2
        }
    }

    #[test]
    fn test_handle_batch_stops_at_first_unhandled_record() {
        let handler = Counting::default();
        let records: Vec<ConsumerRecord> = (0..5).map(record).collect();

        handler.handle_batch(&ListenerError::Empty, &records);

        assert_eq!(*handler.seen.lock().unwrap(), vec![0, 1, 2]);
        assert!(handler.is_ack_after_handle());
    }
}
