// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Maps a robot token to the base URL of its HTTP endpoint.
#[derive(Debug, Clone)]
pub struct RobotResolver {
    template: String,
}

impl RobotResolver {
    /// `template` must contain a `{name}` placeholder, e.g. `http://{name}:5000`.
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Base URL for `name`, without a trailing slash.
    pub fn resolve(&self, name: &str) -> String {
        self.template.replace("{name}", name).trim_end_matches('/').to_owned()
    }
}
