//! Wire protocol shared by the airlock gateway daemon and its clients.
//!
//! The protocol is datagram-like JSON: one complete request or response
//! frame per transport read, no framing header beyond the transport's
//! natural message boundary. Every field carries a fixed maximum length
//! and frames exceeding [`MAX_FRAME_BYTES`] are rejected outright rather
//! than truncated into silently-wrong data.

pub mod codec;
mod kind;
mod request;
mod response;

pub use codec::{
    CodecError, decode_request, decode_response, encode_request, encode_response, fallback_frame,
};
pub use kind::{RequestKind, UnknownKindError};
pub use request::Request;
pub use response::{Response, STATUS_ERROR, STATUS_OK};

/// Maximum size of one request or response frame in bytes.
pub const MAX_FRAME_BYTES: usize = 4096;

/// Maximum length of the `app_name` (target subsystem) field.
pub const MAX_TARGET_BYTES: usize = 20;

/// Maximum length of the `command` (operation name) field.
pub const MAX_OPERATION_BYTES: usize = 32;

/// Maximum length of the `params` (opaque payload) field.
pub const MAX_PAYLOAD_BYTES: usize = 4096;

/// Maximum length of a response error message.
pub const MAX_ERROR_BYTES: usize = 256;
