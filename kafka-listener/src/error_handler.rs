use tracing::{error, warn};

use crate::error::ListenerError;
use crate::record::ConsumerRecord;
use crate::traits::{AfterRollbackProcessor, CommonErrorHandler};

/// Logs the failure and lets the container move past the record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl CommonErrorHandler for LoggingErrorHandler {
    fn handle_record(&self, error: &ListenerError, record: &ConsumerRecord) -> bool {
        warn!(
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset,
            "skipping record after listener error: {}",
            error
        );
        true
    }
}

/// Logs the records left unprocessed by a rolled back transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAfterRollbackProcessor;

impl AfterRollbackProcessor for LoggingAfterRollbackProcessor {
    fn process(&self, records: &[ConsumerRecord], error: &ListenerError) {
        for record in records {
            error!(
                topic = %record.topic,
                partition = record.partition,
                offset = record.offset,
                "record not processed, transaction rolled back: {}",
                error
            );
        }
    }
}
