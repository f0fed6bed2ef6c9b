//! Client-facing request/response protocol and TCP server

pub mod protocol;
pub mod server;

pub use protocol::{encode_reply, parse_request, DecodeError, STATUS_ERROR, STATUS_OK};
pub use server::MetaServer;
