// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tessera integration tests.
//!
//! Provides recording host services and a descriptor builder for fast,
//! deterministic tests of the plugin runtime.
//!
//! # Components
//!
//! - [`PluginBuilder`] - Descriptors with logging, failing or slow hooks
//! - [`RecordingErrorHandler`] - Captures every contained plugin error
//! - [`MockDataClient`] - Data client with pre-configured responses
//! - [`RecordingNavigator`] / [`RecordingNotifier`] - Capture host calls
//! - [`EventLog`] - Shared, ordered log for sequencing assertions

pub mod builder;
pub mod mock_client;
pub mod recording;

pub use builder::PluginBuilder;
pub use mock_client::MockDataClient;
pub use recording::{ErrorEvent, EventLog, RecordingErrorHandler, RecordingNavigator, RecordingNotifier};
