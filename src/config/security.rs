//! Security configuration: replay window, notification lock timing and the
//! outbound call timeout.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Security configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Accepted clock skew for inbound signed calls, in seconds
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: u64,

    /// Notification lock TTL in seconds
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_secs: u64,

    /// Bounded wait for the notification lock, in milliseconds
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,

    /// Pause between lock attempts, in milliseconds
    #[serde(default = "default_lock_poll")]
    pub lock_poll_ms: u64,

    /// Timeout applied to each outbound provider call, in seconds
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_secs: u64,
}

impl SecurityConfig {
    pub fn replay_window(&self) -> Duration {
        Duration::from_secs(self.replay_window_secs)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    pub fn lock_poll(&self) -> Duration {
        Duration::from_millis(self.lock_poll_ms)
    }

    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }

    /// Validate security configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.replay_window_secs == 0 || self.replay_window_secs > 3600 {
            return Err(ValidationError::InvalidReplayWindow);
        }
        if self.lock_ttl_secs == 0
            || self.lock_poll_ms == 0
            || self.lock_wait() >= self.lock_ttl()
        {
            return Err(ValidationError::InvalidLockTiming);
        }
        if self.outbound_timeout_secs == 0 || self.outbound_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            replay_window_secs: default_replay_window(),
            lock_ttl_secs: default_lock_ttl(),
            lock_wait_ms: default_lock_wait(),
            lock_poll_ms: default_lock_poll(),
            outbound_timeout_secs: default_outbound_timeout(),
        }
    }
}

fn default_replay_window() -> u64 {
    60
}

fn default_lock_ttl() -> u64 {
    10
}

fn default_lock_wait() -> u64 {
    3000
}

fn default_lock_poll() -> u64 {
    50
}

fn default_outbound_timeout() -> u64 {
    5
}
