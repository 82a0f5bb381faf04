// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

/// How the registry treats operations reported for a robot it has never seen.
///
/// - `Explicit`: robots must be registered first (`/control/eventId` or
///   `POST /api/v1/robots`); operations for unknown names fail.
/// - `Auto`: the first reported operation creates the robot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPolicy {
    #[default]
    Explicit,
    Auto,
}

impl std::fmt::Display for RegistrationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl std::str::FromStr for RegistrationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "explicit" => Ok(Self::Explicit),
            "auto" => Ok(Self::Auto),
            other => anyhow::bail!("invalid registration policy: {other}"),
        }
    }
}

/// Resolution rule when several robot names collapse to the same short id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ShortIdCollision {
    /// The robot seen first wins.
    #[default]
    FirstMatch,
    /// Lookups by a colliding short id fail with `AmbiguousShortId`.
    Reject,
}

impl std::fmt::Display for ShortIdCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstMatch => f.write_str("first-match"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl std::str::FromStr for ShortIdCollision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-match" | "first_match" => Ok(Self::FirstMatch),
            "reject" => Ok(Self::Reject),
            other => anyhow::bail!("invalid short id collision policy: {other}"),
        }
    }
}

/// Control-plane gateway for a fleet of remote robots.
#[derive(Debug, Clone, Parser)]
#[command(name = "robogate", version, about)]
pub struct GatewayConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "ROBOGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "ROBOGATE_PORT")]
    pub port: u16,

    /// Registration policy for unknown robots (explicit, auto).
    #[arg(long, default_value = "explicit", env = "ROBOGATE_REGISTRATION")]
    pub registration: String,

    /// Short id collision policy (first-match, reject).
    #[arg(long, default_value = "first-match", env = "ROBOGATE_SHORT_ID_COLLISION")]
    pub short_id_collision: String,

    /// Robot base URL template; `{name}` is replaced by the robot token.
    #[arg(long, default_value = "http://{name}:5000", env = "ROBOGATE_ROBOT_URL_TEMPLATE")]
    pub robot_url_template: String,

    /// Dashboard broadcast interval in milliseconds.
    #[arg(long, default_value_t = 5000, env = "ROBOGATE_BROADCAST_MS")]
    pub broadcast_ms: u64,

    /// Upper bound for a single dashboard push in milliseconds.
    #[arg(long, default_value_t = 2000, env = "ROBOGATE_PUSH_TIMEOUT_MS")]
    pub push_timeout_ms: u64,

    /// Upper bound for a forwarded robot command in milliseconds.
    #[arg(long, default_value_t = 10000, env = "ROBOGATE_FORWARD_TIMEOUT_MS")]
    pub forward_timeout_ms: u64,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "ROBOGATE_LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "ROBOGATE_LOG_LEVEL")]
    pub log_level: String,
}

impl GatewayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.registration_policy()?;
        self.short_id_collision()?;

        if !self.robot_url_template.contains("{name}") {
            anyhow::bail!("--robot-url-template must contain a {{name}} placeholder");
        }
        if self.broadcast_ms == 0 {
            anyhow::bail!("--broadcast-ms must be greater than zero");
        }
        if self.push_timeout_ms == 0 {
            anyhow::bail!("--push-timeout-ms must be greater than zero");
        }
        if self.forward_timeout_ms == 0 {
            anyhow::bail!("--forward-timeout-ms must be greater than zero");
        }

        Ok(())
    }

    pub fn registration_policy(&self) -> anyhow::Result<RegistrationPolicy> {
        self.registration.parse()
    }

    pub fn short_id_collision(&self) -> anyhow::Result<ShortIdCollision> {
        self.short_id_collision.parse()
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_ms)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }

    /// Build a minimal `GatewayConfig` for tests (port 0, slow broadcast).
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            registration: "explicit".into(),
            short_id_collision: "first-match".into(),
            robot_url_template: "http://{name}:5000".into(),
            broadcast_ms: 60_000,
            push_timeout_ms: 500,
            forward_timeout_ms: 2_000,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
