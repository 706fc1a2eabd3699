//! Declarative copying of optional values onto setters.
//!
//! ```ignore
//! let map = PropertyMapper::new("container");
//! map.from("ack_time", properties.ack_time)
//!     .map(EnvDuration::to_millis)
//!     .to(|ms| container.set_ack_time(ms));
//! ```
//!
//! An absent value never reaches the setter, so whatever the destination held
//! before stays in place.

use std::cell::Cell;

use tracing::debug;

pub struct PropertyMapper {
    target: &'static str,
    applied: Cell<usize>,
}

impl PropertyMapper {
    pub fn new(target: &'static str) -> Self {
        Self {
            target,
            applied: Cell::new(0),
        }
    }

    pub fn from<T>(&self, name: &'static str, value: Option<T>) -> Source<'_, T> {
        Source {
            mapper: self,
            name,
            value,
        }
    }

    /// Number of values handed to a setter so far.
    pub fn applied(&self) -> usize {
        self.applied.get()
    }
}

/// A value on its way to a setter.
#[must_use = "a source does nothing until `to` is called"]
pub struct Source<'a, T> {
    mapper: &'a PropertyMapper,
    name: &'static str,
    value: Option<T>,
}

impl<'a, T> Source<'a, T> {
    /// Convert a present value.
    pub fn map<R>(self, convert: impl FnOnce(T) -> R) -> Source<'a, R> {
        Source {
            mapper: self.mapper,
            name: self.name,
            value: self.value.map(convert),
        }
    }

    /// Drop the value unless it satisfies `predicate`.
    pub fn when(self, predicate: impl FnOnce(&T) -> bool) -> Self {
        Source {
            value: self.value.filter(predicate),
            ..self
        }
    }

    /// Hand the value to `setter` if one is still present.
    pub fn to(self, setter: impl FnOnce(T)) {
        if let Some(value) = self.value {
            debug!(
                target_object = self.mapper.target,
                property = self.name,
                "applying listener property"
            );
            setter(value);
            self.mapper.applied.set(self.mapper.applied.get() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Destination {
        millis: Option<u64>,
        flag: bool,
        name: String,
    }

    #[test]
    fn test_absent_values_leave_destination_untouched() {
        let mut destination = Destination {
            millis: Some(7),
            flag: true,
            name: "default".to_owned(),
        };

        let map = PropertyMapper::new("destination");
        map.from("millis", None::<u64>)
            .to(|v| destination.millis = Some(v));
        map.from("flag", None::<bool>).to(|v| destination.flag = v);
        map.from("name", None::<String>)
            .to(|v| destination.name = v);

        assert_eq!(destination.millis, Some(7));
        assert!(destination.flag);
        assert_eq!(destination.name, "default");
        assert_eq!(map.applied(), 0);
    }

    #[test]
    fn test_present_values_are_converted_and_applied() {
        let mut destination = Destination::default();

        let map = PropertyMapper::new("destination");
        map.from("millis", Some(std::time::Duration::from_secs(5)))
            .map(|d| d.as_millis() as u64)
            .to(|v| destination.millis = Some(v));
        map.from("name", Some("consumer"))
            .map(str::to_owned)
            .to(|v| destination.name = v);

        assert_eq!(destination.millis, Some(5000));
        assert_eq!(destination.name, "consumer");
        assert_eq!(map.applied(), 2);
    }

    #[test]
    fn test_when_filters_values() {
        let mut destination = Destination::default();

        let map = PropertyMapper::new("destination");
        map.from("flag", Some(3))
            .when(|v| *v > 5)
            .to(|_| destination.flag = true);
        assert!(!destination.flag);

        map.from("flag", Some(8))
            .when(|v| *v > 5)
            .to(|_| destination.flag = true);
        assert!(destination.flag);
        assert_eq!(map.applied(), 1);
    }
}
