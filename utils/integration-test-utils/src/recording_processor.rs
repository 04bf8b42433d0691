/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

use mailbox_streamer::{EventProcessor, RoutedEventRecord};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Event processor that keeps every routed record for later assertions.
#[derive(Clone, Default)]
pub struct RecordingProcessor {
    records: Arc<Mutex<Vec<RoutedEventRecord>>>,
}

impl RecordingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RoutedEventRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventProcessor for RecordingProcessor {
    fn process(&self, record: RoutedEventRecord) {
        debug!(
            "recording {} event(s) for {}",
            record.events().len(),
            record.principal()
        );
        self.records.lock().unwrap().push(record);
    }
}
