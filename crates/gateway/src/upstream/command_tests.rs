// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    forward       = { "forward", Some("10"), Command::Forward(10), "POST", "/forward/10" },
    backward      = { "backward", Some("5"), Command::Backward(5), "POST", "/backward/5" },
    left          = { "left", Some("90"), Command::Left(90), "POST", "/left/90" },
    right         = { "right", Some("0"), Command::Right(0), "POST", "/right/0" },
    remote_status = { "remote_status", None, Command::RemoteStatus, "GET", "/remote_status" },
    distance      = { "distance", None, Command::Distance, "GET", "/distance" },
)]
fn parse_and_map(name: &str, arg: Option<&str>, expected: Command, method: &str, path: &str) {
    let command = Command::parse(name, arg);
    assert_eq!(command, Ok(expected));
    assert_eq!(expected.name(), name);
    assert_eq!(expected.method().as_str(), method);
    assert_eq!(expected.path(), path);
}

#[yare::parameterized(
    unknown        = { "jump", Some("1") },
    camera         = { "camera", None },
    missing_amount = { "forward", None },
    bad_amount     = { "left", Some("ninety") },
    negative       = { "right", Some("-5") },
    extra_arg      = { "distance", Some("3") },
)]
fn parse_rejects(name: &str, arg: Option<&str>) {
    assert_eq!(Command::parse(name, arg), Err(GatewayError::BadRequest));
}
