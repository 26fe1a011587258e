//! parley-core: session lifecycle and message routing for the parley relay
//!
//! This crate is transport-agnostic. A transport feeds connection events
//! into the [`Gateway`] and drains each connection's [`Outbound`] queue:
//!
//! - **Registry** - [`SessionRegistry`] is the authoritative map of logged-in sessions
//! - **Routing** - [`CommandRouter`] runs the per-connection protocol state machine
//! - **Delivery** - broadcast fanout and unicast delivery over the registry
//! - **Gateway** - [`Gateway`] turns accept/frame/error/close events into router calls
//!
//! # Architecture
//!
//! ```text
//!  transport ──▶ Gateway ──▶ CommandRouter ──▶ SessionRegistry
//!                                  │                 │
//!                                  ▼                 ▼
//!                            reply to sender   broadcast / deliver
//!                                  │                 │
//!                                  └──▶ Outbound ◀───┘
//! ```

pub mod connection;
mod delivery;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod router;

pub use connection::{ConnectionId, Outbound};
pub use error::{DeliveryError, ProtocolError, RegistryError, RelayError};
pub use gateway::{Gateway, Handshake, IdentityStrategy};
pub use protocol::{ClientInfo, ClientMessage, ServerMessage};
pub use registry::{Directory, Session, SessionRegistry};
pub use router::{CommandRouter, ConnectionState, PendingSession};
