//! # notify-relay
//!
//! Topic-based notification relay. Clients register an email address and
//! subscribe it to named topics; publishers emit messages on a topic; every
//! subscriber of that topic is notified asynchronously by email.
//!
//! The HTTP layer only validates and hands work over. Publishing goes
//! through a broker transport, and the dispatch core fans each message out
//! to subscribers with per-recipient failure isolation.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket observers)
//!     │
//!     ├── REST Handlers (api/)          ── WS event stream (ws/)
//!     │                                        ▲
//!     ├── RelayService (service/)  ──► EventBus (domain/)
//!     │        │                               ▲
//!     │        ├── SubscriberRegistry (domain/, persistence/)
//!     │        └── Broker (broker/: in-process or NATS)
//!     │                 │ mpsc
//!     ├── BrokerRelay (service/)
//!     │        │ one task per message
//!     ├── DispatchCoordinator (service/)
//!     │        │ JoinSet, one job per subscriber
//!     └── NotificationSender (notify/) ──► Mailer (Resend or outbox)
//! ```

pub mod api;
pub mod app_state;
pub mod broker;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod ws;
