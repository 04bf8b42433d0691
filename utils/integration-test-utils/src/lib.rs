/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Test doubles for driving `mailbox-streamer` without a remote service.

mod fake_streaming_service;
pub use fake_streaming_service::{ConnectionOp, FakeConnection, FakeStreamingClient};

mod integration_test_utils;
pub use integration_test_utils::{init_logging, wait_until};

mod recording_processor;
pub use recording_processor::RecordingProcessor;
