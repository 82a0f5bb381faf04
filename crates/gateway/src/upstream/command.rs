// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client command vocabulary and its mapping onto the robot HTTP API.

use reqwest::Method;

use crate::error::GatewayError;

/// A command a client can send to a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive forward by a distance.
    Forward(u32),
    /// Drive backward by a distance.
    Backward(u32),
    /// Turn left by a number of degrees.
    Left(u32),
    /// Turn right by a number of degrees.
    Right(u32),
    RemoteStatus,
    Distance,
}

impl Command {
    /// Parse a command name and its optional path argument.
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self, GatewayError> {
        let amount = || -> Result<u32, GatewayError> {
            arg.ok_or(GatewayError::BadRequest)?.parse::<u32>().map_err(|_| GatewayError::BadRequest)
        };

        match (name, arg) {
            ("forward", _) => Ok(Self::Forward(amount()?)),
            ("backward", _) => Ok(Self::Backward(amount()?)),
            ("left", _) => Ok(Self::Left(amount()?)),
            ("right", _) => Ok(Self::Right(amount()?)),
            ("remote_status", None) => Ok(Self::RemoteStatus),
            ("distance", None) => Ok(Self::Distance),
            _ => Err(GatewayError::BadRequest),
        }
    }

    /// Operation name recorded in the registry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward(_) => "forward",
            Self::Backward(_) => "backward",
            Self::Left(_) => "left",
            Self::Right(_) => "right",
            Self::RemoteStatus => "remote_status",
            Self::Distance => "distance",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::Forward(_) | Self::Backward(_) | Self::Left(_) | Self::Right(_) => Method::POST,
            Self::RemoteStatus | Self::Distance => Method::GET,
        }
    }

    /// Path on the robot's own HTTP API.
    pub fn path(&self) -> String {
        match self {
            Self::Forward(n) | Self::Backward(n) | Self::Left(n) | Self::Right(n) => {
                format!("/{}/{n}", self.name())
            }
            Self::RemoteStatus | Self::Distance => format!("/{}", self.name()),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
