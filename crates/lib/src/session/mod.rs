//! Live document sessions.
//!
//! This module multiplexes many concurrent per-document WebSocket
//! connections: an incoming connection is authorized, registered, and fed a
//! presence snapshot; incoming edit operations are applied to the document's
//! replica and relayed to every other connection; caret moves and
//! join/leave events flow as presence frames.

pub mod errors;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod server;

pub use errors::SessionError;
pub use protocol::{ClientMessage, ServerMessage, UserAction, color_for_user};
pub use registry::{ConnectionHandle, ConnectionId, Departure, SessionRegistry};
pub use server::CollabServer;
