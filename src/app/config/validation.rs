use super::{ConfigError, SinkConfig};
use crate::listener::MAX_QUEUE_CAPACITY;

impl SinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Listener name must not be empty".to_string(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidConfig(format!(
                "Queue capacity ({}) must not exceed {}",
                self.queue_capacity, MAX_QUEUE_CAPACITY
            )));
        }

        if self.flush_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Flush timeout must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Shutdown timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
