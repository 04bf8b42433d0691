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

//! # mailbox-streamer
//!
//! `mailbox-streamer` keeps one long-lived streaming connection to a remote
//! notification service and multiplexes many per-principal subscriptions over
//! it. Callers register interest for a mailbox through
//! [`StreamingSubscriptionCollection`]; inbound notification batches are routed
//! back to the principal that produced them and handed to an
//! [`EventProcessor`].
//!
//! The remote protocol client is not implemented here. It is consumed through
//! the [`StreamingClient`] / [`StreamingConnection`] / [`ConnectionListener`]
//! traits.
//!
//! ```
//! use std::sync::Arc;
//! use mailbox_streamer::{
//!     EventCategory, ResourceId, RoutedEventRecord, StreamingClient,
//!     StreamingSubscriptionCollection,
//! };
//! # use async_trait::async_trait;
//! # use mailbox_streamer::{
//! #     ConnectionListener, ServiceError, StreamingConnection, SubscribeRequest,
//! #     SubscriptionHandle, SubscriptionId,
//! # };
//! # use std::sync::atomic::{AtomicBool, Ordering};
//! #
//! # struct MockConnection(AtomicBool);
//! #
//! # #[async_trait]
//! # impl StreamingConnection for MockConnection {
//! #     async fn open(&self) -> Result<(), ServiceError> {
//! #         self.0.store(true, Ordering::SeqCst);
//! #         Ok(())
//! #     }
//! #     async fn close(&self) -> Result<(), ServiceError> {
//! #         self.0.store(false, Ordering::SeqCst);
//! #         Ok(())
//! #     }
//! #     fn is_open(&self) -> bool {
//! #         self.0.load(Ordering::SeqCst)
//! #     }
//! #     async fn add_subscription(&self, _handle: &SubscriptionHandle) -> Result<(), ServiceError> {
//! #         Ok(())
//! #     }
//! #     async fn remove_subscription(&self, _handle: &SubscriptionHandle) -> Result<(), ServiceError> {
//! #         Ok(())
//! #     }
//! #     async fn dispose(&self) {}
//! # }
//! #
//! # struct MockClient;
//! #
//! # #[async_trait]
//! # impl StreamingClient for MockClient {
//! #     fn endpoint(&self) -> &str {
//! #         "https://mail.example.com/ews/exchange.asmx"
//! #     }
//! #     async fn create_connection(
//! #         &self,
//! #         _max_notifications_per_batch: u16,
//! #         _listener: Arc<dyn ConnectionListener>,
//! #     ) -> Result<Arc<dyn StreamingConnection>, ServiceError> {
//! #         Ok(Arc::new(MockConnection(AtomicBool::new(false))))
//! #     }
//! #     async fn subscribe_to_streaming_notifications(
//! #         &self,
//! #         request: SubscribeRequest,
//! #     ) -> Result<SubscriptionHandle, ServiceError> {
//! #         Ok(SubscriptionHandle::new(SubscriptionId::new(request.principal.as_str())))
//! #     }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client: Arc<dyn StreamingClient> = Arc::new(MockClient);
//! let collection = StreamingSubscriptionCollection::new(
//!     client,
//!     Arc::new(|record: RoutedEventRecord| {
//!         println!("{}: {} event(s)", record.principal(), record.events().len());
//!     }),
//!     "mailbox-group-1",
//! )
//! .await
//! .unwrap();
//!
//! collection
//!     .add("alice@x.com", [ResourceId::new("inbox")], [EventCategory::NewMail])
//!     .await
//!     .unwrap();
//! assert!(collection.is_connection_open());
//!
//! // Removing the last subscription leaves the connection closed.
//! assert!(collection.remove("alice@x.com").await.unwrap());
//! assert!(!collection.remove("alice@x.com").await.unwrap());
//! assert!(!collection.is_connection_open());
//!
//! assert!(collection
//!     .add("not-an-email", [ResourceId::new("inbox")], [EventCategory::NewMail])
//!     .await
//!     .is_err());
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`StreamingSubscriptionCollection`]
//! - Control plane: connection lifecycle, intentional-close flag and the
//!   principal registry
//! - Data plane: connection listener and event router
//! - Runtime: disconnect supervisor task
//!
//! ## Observability model
//!
//! The crate emits `tracing` events with the names in [`observability::events`]
//! and never installs a global subscriber. Binaries and tests are responsible
//! for `tracing_subscriber` initialization.

mod config;
pub use config::{ConfigError, CoordinatorConfig, ReconnectPolicy};

mod control_plane;
mod data_plane;

mod error;
pub use error::CoordinatorError;

mod notification;
pub use notification::{
    EventCategory, EventProcessor, NotificationBatch, NotificationEvent, ResourceId,
    RoutedEventRecord,
};

#[doc(hidden)]
pub mod observability;

mod principal;
pub use principal::{PrincipalKey, ValidationError};

mod runtime;

mod service;
pub use service::{
    ConnectionListener, DisconnectContext, RoutingHints, ServiceError, ServiceErrorCode,
    StreamingClient, StreamingConnection, SubscribeRequest, SubscriptionErrorContext,
    SubscriptionHandle, SubscriptionId,
};

mod subscription_collection;
pub use subscription_collection::StreamingSubscriptionCollection;
