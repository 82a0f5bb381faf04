// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GatewayError;
use crate::state::GatewayState;
use crate::upstream::client::RobotClient;
use crate::upstream::command::Command;

/// A dispatch that did not produce a robot response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub code: GatewayError,
    pub message: String,
}

impl DispatchFailure {
    fn new(code: GatewayError, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

/// Forward `command` to the robot identified by `token`.
///
/// The operation is recorded before any network call. A disconnected robot
/// is never contacted. Otherwise the outcome of the call is recorded as the
/// robot's reachability.
pub async fn dispatch(
    state: &GatewayState,
    token: &str,
    command: &Command,
) -> Result<String, DispatchFailure> {
    let disconnected = state
        .registry
        .record_operation(token, command.name())
        .map_err(|code| DispatchFailure::new(code, format!("robot not registered: {token}")))?;

    if disconnected {
        tracing::info!(robot = %token, operation = command.name(), "robot disconnected, command dropped");
        return Err(DispatchFailure::new(
            GatewayError::RobotDisconnected,
            format!("robot disconnected: {token}"),
        ));
    }

    let client = RobotClient::new(state.http.clone(), state.resolver.resolve(token));
    let result = client.send(command).await;
    state.registry.set_reachable(token, result.is_ok());

    match result {
        Ok(body) => Ok(body),
        Err(e) => {
            tracing::warn!(robot = %token, operation = command.name(), err = %e, "forward failed");
            Err(DispatchFailure::new(GatewayError::UpstreamError, format!("robot unreachable: {e}")))
        }
    }
}
