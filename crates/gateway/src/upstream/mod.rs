// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot-side communication: address resolution, command vocabulary, HTTP
//! client, and the dispatch path that ties them to the registry.

pub mod client;
pub mod command;
pub mod dispatch;
pub mod resolver;
