use std::fmt;
use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

use crate::container::AckMode;

/// Listener settings as supplied by the environment. Every `Option` field is only
/// applied to a listener container factory when present.
#[derive(Envconfig, Clone, Debug)]
pub struct ListenerProperties {
    #[envconfig(from = "KAFKA_LISTENER_TYPE", default = "single")]
    pub listener_type: ListenerType,

    #[envconfig(from = "KAFKA_LISTENER_CONCURRENCY")]
    pub concurrency: Option<u32>,

    #[envconfig(from = "KAFKA_LISTENER_AUTO_STARTUP", default = "true")]
    pub auto_startup: bool,

    #[envconfig(from = "KAFKA_LISTENER_ACK_MODE")]
    pub ack_mode: Option<AckMode>,

    #[envconfig(from = "KAFKA_LISTENER_ASYNC_ACKS")]
    pub async_acks: Option<bool>,

    #[envconfig(from = "KAFKA_LISTENER_CLIENT_ID")]
    pub client_id: Option<String>,

    // Records between offset commits when ack mode is COUNT or COUNT_TIME
    #[envconfig(from = "KAFKA_LISTENER_ACK_COUNT")]
    pub ack_count: Option<u32>,

    // Time between offset commits when ack mode is TIME or COUNT_TIME
    #[envconfig(from = "KAFKA_LISTENER_ACK_TIME")]
    pub ack_time: Option<EnvDuration>,

    #[envconfig(from = "KAFKA_LISTENER_POLL_TIMEOUT")]
    pub poll_timeout: Option<EnvDuration>,

    // Multiplier applied to poll_timeout to decide whether a consumer is non-responsive
    #[envconfig(from = "KAFKA_LISTENER_NO_POLL_THRESHOLD")]
    pub no_poll_threshold: Option<f32>,

    #[envconfig(from = "KAFKA_LISTENER_IDLE_BETWEEN_POLLS", default = "0")]
    pub idle_between_polls: EnvDuration,

    #[envconfig(from = "KAFKA_LISTENER_IDLE_EVENT_INTERVAL")]
    pub idle_event_interval: Option<EnvDuration>,

    #[envconfig(from = "KAFKA_LISTENER_IDLE_PARTITION_EVENT_INTERVAL")]
    pub idle_partition_event_interval: Option<EnvDuration>,

    // Time between checks for non-responsive consumers, applied in whole seconds
    #[envconfig(from = "KAFKA_LISTENER_MONITOR_INTERVAL")]
    pub monitor_interval: Option<EnvSecsDuration>,

    #[envconfig(from = "KAFKA_LISTENER_LOG_CONTAINER_CONFIG")]
    pub log_container_config: Option<bool>,

    #[envconfig(from = "KAFKA_LISTENER_MISSING_TOPICS_FATAL", default = "false")]
    pub missing_topics_fatal: bool,

    #[envconfig(from = "KAFKA_LISTENER_IMMEDIATE_STOP", default = "false")]
    pub immediate_stop: bool,
}

impl Default for ListenerProperties {
    fn default() -> Self {
        Self {
            listener_type: ListenerType::Single,
            concurrency: None,
            auto_startup: true,
            ack_mode: None,
            async_acks: None,
            client_id: None,
            ack_count: None,
            ack_time: None,
            poll_timeout: None,
            no_poll_threshold: None,
            idle_between_polls: EnvDuration(time::Duration::ZERO),
            idle_event_interval: None,
            idle_partition_event_interval: None,
            monitor_interval: None,
            log_container_config: None,
            missing_topics_fatal: false,
            immediate_stop: false,
        }
    }
}

/// Whether the listener is invoked once per record or once per polled batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerType {
    #[default]
    Single,
    Batch,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseListenerTypeError(pub String);

impl FromStr for ListenerType {
    type Err = ParseListenerTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "record" => Ok(ListenerType::Single),
            "batch" => Ok(ListenerType::Batch),
            invalid => Err(ParseListenerTypeError(invalid.to_owned())),
        }
    }
}

impl fmt::Display for ListenerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ListenerType::Single => write!(f, "single"),
            ListenerType::Batch => write!(f, "batch"),
        }
    }
}

/// A duration read from the environment. A bare integer is taken as milliseconds,
/// otherwise one of the `ns`, `us`, `ms`, `s`, `m`, `h` or `d` suffixes is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvDurationError;

impl EnvDuration {
    /// Whole milliseconds, saturating at `u64::MAX`.
    pub fn to_millis(self) -> u64 {
        u64::try_from(self.0.as_millis()).unwrap_or(u64::MAX)
    }

    /// Whole seconds with the fractional part dropped, saturating at `i32::MAX`.
    pub fn to_seconds(self) -> i32 {
        i32::try_from(self.0.as_secs()).unwrap_or(i32::MAX)
    }
}

impl FromStr for EnvDuration {
    type Err = ParseEnvDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s, time::Duration::from_millis).map(EnvDuration)
    }
}

/// Like [`EnvDuration`], but a bare integer is taken as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSecsDuration(pub time::Duration);

impl EnvSecsDuration {
    /// Whole seconds with the fractional part dropped, saturating at `i32::MAX`.
    pub fn to_seconds(self) -> i32 {
        EnvDuration(self.0).to_seconds()
    }
}

impl FromStr for EnvSecsDuration {
    type Err = ParseEnvDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s, time::Duration::from_secs).map(EnvSecsDuration)
    }
}

fn parse_duration(
    s: &str,
    bare: fn(u64) -> time::Duration,
) -> Result<time::Duration, ParseEnvDurationError> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (amount, unit) = s.split_at(split);
    let amount = amount.parse::<u64>().map_err(|_| ParseEnvDurationError)?;

    let seconds = |multiplier: u64| {
        amount
            .checked_mul(multiplier)
            .map(time::Duration::from_secs)
            .ok_or(ParseEnvDurationError)
    };

    match unit.trim().to_ascii_lowercase().as_str() {
        "" => Ok(bare(amount)),
        "ms" => Ok(time::Duration::from_millis(amount)),
        "ns" => Ok(time::Duration::from_nanos(amount)),
        "us" => Ok(time::Duration::from_micros(amount)),
        "s" => seconds(1),
        "m" => seconds(60),
        "h" => seconds(60 * 60),
        "d" => seconds(24 * 60 * 60),
        _ => Err(ParseEnvDurationError),
    }
}
