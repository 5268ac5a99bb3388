//! Connectivity state machine for the live log stream.
//!
//! The stream task drives a [`ConnectionMachine`] through
//! `Disconnected → Connecting → Connected → Disconnected → ...`. Every
//! disconnect, whether a graceful close, a transport error or a failed
//! attempt, schedules the next attempt after the policy's delay. There is no
//! retry cap and no terminal state.

use std::time::Duration;

use logtide_types::ConnectionState;

/// Delay applied between a disconnect and the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    /// Retry forever with the same delay after every disconnect.
    pub const fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_DELAY)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempts: u64,
    policy: ReconnectPolicy,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: 0,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Total number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Start a new connection attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u64 {
        self.attempts += 1;
        self.state = ConnectionState::Connecting { attempt: self.attempts };
        self.attempts
    }

    /// Mark the attempt in flight as established.
    ///
    /// Returns `false` and leaves the state untouched if no attempt was in
    /// flight.
    pub fn opened(&mut self) -> bool {
        if matches!(self.state, ConnectionState::Connecting { .. }) {
            self.state = ConnectionState::Connected;
            true
        } else {
            false
        }
    }

    /// Record a disconnect from any state and return the delay before the
    /// next attempt.
    pub fn closed(&mut self) -> Duration {
        self.state = ConnectionState::Disconnected;
        self.policy.delay()
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
