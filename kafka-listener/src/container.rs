use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::traits::{RebalanceListener, TransactionManager};

/// When consumed offsets are committed back to the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// Commit after each record is processed by the listener.
    Record,
    /// Commit once every record returned by a poll has been processed.
    #[default]
    Batch,
    /// Commit pending offsets once `ack_time` has elapsed since the last commit.
    Time,
    /// Commit pending offsets once `ack_count` records have been processed.
    Count,
    /// Commit when either the `Time` or the `Count` condition is met.
    CountTime,
    /// The listener acknowledges, acknowledgments are committed with the next batch.
    Manual,
    /// The listener acknowledges and the commit happens right away.
    ManualImmediate,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseAckModeError(pub String);

impl FromStr for AckMode {
    type Err = ParseAckModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "RECORD" => Ok(AckMode::Record),
            "BATCH" => Ok(AckMode::Batch),
            "TIME" => Ok(AckMode::Time),
            "COUNT" => Ok(AckMode::Count),
            "COUNT_TIME" => Ok(AckMode::CountTime),
            "MANUAL" => Ok(AckMode::Manual),
            "MANUAL_IMMEDIATE" => Ok(AckMode::ManualImmediate),
            invalid => Err(ParseAckModeError(invalid.to_owned())),
        }
    }
}

impl fmt::Display for AckMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AckMode::Record => write!(f, "RECORD"),
            AckMode::Batch => write!(f, "BATCH"),
            AckMode::Time => write!(f, "TIME"),
            AckMode::Count => write!(f, "COUNT"),
            AckMode::CountTime => write!(f, "COUNT_TIME"),
            AckMode::Manual => write!(f, "MANUAL"),
            AckMode::ManualImmediate => write!(f, "MANUAL_IMMEDIATE"),
        }
    }
}

/// Runtime settings shared by every container a factory creates.
#[derive(Clone, Debug)]
pub struct ContainerProperties {
    ack_mode: AckMode,
    async_acks: bool,
    client_id: String,
    ack_count: u32,
    ack_time_ms: u64,
    poll_timeout_ms: u64,
    no_poll_threshold: f32,
    idle_between_polls_ms: u64,
    idle_event_interval_ms: Option<u64>,
    idle_partition_event_interval_ms: Option<u64>,
    monitor_interval_secs: i32,
    log_container_config: bool,
    missing_topics_fatal: bool,
    stop_immediate: bool,
    transaction_manager: Option<Arc<dyn TransactionManager>>,
    rebalance_listener: Option<Arc<dyn RebalanceListener>>,
}

pub const DEFAULT_ACK_TIME_MS: u64 = 5000;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_NO_POLL_THRESHOLD: f32 = 3.0;
pub const DEFAULT_MONITOR_INTERVAL_SECS: i32 = 30;

impl Default for ContainerProperties {
    fn default() -> Self {
        Self {
            ack_mode: AckMode::default(),
            async_acks: false,
            client_id: String::new(),
            ack_count: 1,
            ack_time_ms: DEFAULT_ACK_TIME_MS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            no_poll_threshold: DEFAULT_NO_POLL_THRESHOLD,
            idle_between_polls_ms: 0,
            idle_event_interval_ms: None,
            idle_partition_event_interval_ms: None,
            monitor_interval_secs: DEFAULT_MONITOR_INTERVAL_SECS,
            log_container_config: false,
            missing_topics_fatal: false,
            stop_immediate: false,
            transaction_manager: None,
            rebalance_listener: None,
        }
    }
}

impl ContainerProperties {
    pub fn set_ack_mode(&mut self, ack_mode: AckMode) {
        self.ack_mode = ack_mode;
    }

    pub fn set_async_acks(&mut self, async_acks: bool) {
        self.async_acks = async_acks;
    }

    /// Prefix for the client id of every child container, suffixed with `-n`.
    pub fn set_client_id(&mut self, client_id: String) {
        self.client_id = client_id;
    }

    pub fn set_ack_count(&mut self, ack_count: u32) {
        self.ack_count = ack_count;
    }

    pub fn set_ack_time(&mut self, ack_time_ms: u64) {
        self.ack_time_ms = ack_time_ms;
    }

    pub fn set_poll_timeout(&mut self, poll_timeout_ms: u64) {
        self.poll_timeout_ms = poll_timeout_ms;
    }

    pub fn set_no_poll_threshold(&mut self, no_poll_threshold: f32) {
        self.no_poll_threshold = no_poll_threshold;
    }

    pub fn set_idle_between_polls(&mut self, idle_between_polls_ms: u64) {
        self.idle_between_polls_ms = idle_between_polls_ms;
    }

    pub fn set_idle_event_interval(&mut self, idle_event_interval_ms: u64) {
        self.idle_event_interval_ms = Some(idle_event_interval_ms);
    }

    pub fn set_idle_partition_event_interval(&mut self, interval_ms: u64) {
        self.idle_partition_event_interval_ms = Some(interval_ms);
    }

    pub fn set_monitor_interval(&mut self, monitor_interval_secs: i32) {
        self.monitor_interval_secs = monitor_interval_secs;
    }

    pub fn set_log_container_config(&mut self, log_container_config: bool) {
        self.log_container_config = log_container_config;
    }

    pub fn set_missing_topics_fatal(&mut self, missing_topics_fatal: bool) {
        self.missing_topics_fatal = missing_topics_fatal;
    }

    pub fn set_stop_immediate(&mut self, stop_immediate: bool) {
        self.stop_immediate = stop_immediate;
    }

    pub fn set_transaction_manager(&mut self, transaction_manager: Arc<dyn TransactionManager>) {
        self.transaction_manager = Some(transaction_manager);
    }

    pub fn set_rebalance_listener(&mut self, rebalance_listener: Arc<dyn RebalanceListener>) {
        self.rebalance_listener = Some(rebalance_listener);
    }

    pub fn ack_mode(&self) -> AckMode {
        self.ack_mode
    }

    pub fn is_async_acks(&self) -> bool {
        self.async_acks
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn ack_count(&self) -> u32 {
        self.ack_count
    }

    pub fn ack_time(&self) -> u64 {
        self.ack_time_ms
    }

    pub fn poll_timeout(&self) -> u64 {
        self.poll_timeout_ms
    }

    pub fn no_poll_threshold(&self) -> f32 {
        self.no_poll_threshold
    }

    pub fn idle_between_polls(&self) -> u64 {
        self.idle_between_polls_ms
    }

    pub fn idle_event_interval(&self) -> Option<u64> {
        self.idle_event_interval_ms
    }

    pub fn idle_partition_event_interval(&self) -> Option<u64> {
        self.idle_partition_event_interval_ms
    }

    pub fn monitor_interval(&self) -> i32 {
        self.monitor_interval_secs
    }

    pub fn is_log_container_config(&self) -> bool {
        self.log_container_config
    }

    pub fn is_missing_topics_fatal(&self) -> bool {
        self.missing_topics_fatal
    }

    pub fn is_stop_immediate(&self) -> bool {
        self.stop_immediate
    }

    pub fn transaction_manager(&self) -> Option<&Arc<dyn TransactionManager>> {
        self.transaction_manager.as_ref()
    }

    pub fn rebalance_listener(&self) -> Option<&Arc<dyn RebalanceListener>> {
        self.rebalance_listener.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ack_mode() {
        let cases = [
            ("record", AckMode::Record),
            ("BATCH", AckMode::Batch),
            ("time", AckMode::Time),
            ("count", AckMode::Count),
            ("count_time", AckMode::CountTime),
            ("count-time", AckMode::CountTime),
            ("manual", AckMode::Manual),
            ("Manual_Immediate", AckMode::ManualImmediate),
        ];

        for (input, expected) in cases {
            assert_eq!(AckMode::from_str(input), Ok(expected), "parsing {input:?}");
        }

        assert_eq!(
            AckMode::from_str("eventually"),
            Err(ParseAckModeError("EVENTUALLY".to_owned()))
        );
    }

    #[test]
    fn test_ack_mode_display_parses_back() {
        for mode in [
            AckMode::Record,
            AckMode::Batch,
            AckMode::Time,
            AckMode::Count,
            AckMode::CountTime,
            AckMode::Manual,
            AckMode::ManualImmediate,
        ] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }

    #[test]
    fn test_container_properties_defaults() {
        let properties = ContainerProperties::default();

        assert_eq!(properties.ack_mode(), AckMode::Batch);
        assert!(!properties.is_async_acks());
        assert_eq!(properties.client_id(), "");
        assert_eq!(properties.ack_count(), 1);
        assert_eq!(properties.ack_time(), DEFAULT_ACK_TIME_MS);
        assert_eq!(properties.poll_timeout(), DEFAULT_POLL_TIMEOUT_MS);
        assert_eq!(properties.idle_between_polls(), 0);
        assert_eq!(properties.idle_event_interval(), None);
        assert_eq!(properties.idle_partition_event_interval(), None);
        assert_eq!(properties.monitor_interval(), DEFAULT_MONITOR_INTERVAL_SECS);
        assert!(!properties.is_log_container_config());
        assert!(!properties.is_missing_topics_fatal());
        assert!(!properties.is_stop_immediate());
        assert!(properties.transaction_manager().is_none());
        assert!(properties.rebalance_listener().is_none());
    }
}
