//! Frame codec: JSON bytes in, typed frames out, and back.
//!
//! Decoding never guesses: any structural failure yields a
//! [`CodecError`] and the caller synthesises a generic "invalid
//! request" response instead of interpreting a half-parsed frame.
//! Encoding never exceeds [`MAX_FRAME_BYTES`]: an oversized response
//! falls back to [`fallback_frame`], whose content is static apart from
//! the numeric id and timestamp and therefore always fits.

use thiserror::Error;

use crate::MAX_FRAME_BYTES;
use crate::request::Request;
use crate::response::Response;

/// Errors surfaced while decoding or encoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Inbound frame exceeds the maximum frame size.
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge {
        /// Observed frame size.
        size: usize,
        /// Permitted maximum.
        max: usize,
    },
    /// Frame contained no data after trimming whitespace.
    #[error("empty frame")]
    EmptyFrame,
    /// Frame is not well-formed JSON matching the expected schema.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decodes one request frame.
///
/// # Errors
///
/// Returns [`CodecError`] when the frame is oversized, empty, or not a
/// JSON object with the required `id` and `type` fields.
pub fn decode_request(frame: &[u8]) -> Result<Request, CodecError> {
    let trimmed = check_frame(frame)?;
    Ok(serde_json::from_slice(trimmed)?)
}

/// Decodes one response frame (used by clients and tests).
///
/// # Errors
///
/// Returns [`CodecError`] under the same conditions as
/// [`decode_request`].
pub fn decode_response(frame: &[u8]) -> Result<Response, CodecError> {
    let trimmed = check_frame(frame)?;
    Ok(serde_json::from_slice(trimmed)?)
}

/// Encodes a response frame, falling back to the minimal fixed frame
/// when the canonical encoding would exceed the size bound.
#[must_use]
pub fn encode_response(response: &Response) -> Vec<u8> {
    match serde_json::to_vec(response) {
        Ok(bytes) if bytes.len() <= MAX_FRAME_BYTES => bytes,
        _ => fallback_frame(response.id(), response.timestamp()),
    }
}

/// Encodes a request frame (used by clients and tests).
///
/// # Errors
///
/// Returns [`CodecError::FrameTooLarge`] when the encoded request would
/// not fit in one frame, and [`CodecError::Malformed`] on
/// serialisation failure.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, CodecError> {
    let bytes = serde_json::to_vec(request)?;
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(CodecError::FrameTooLarge {
            size: bytes.len(),
            max: MAX_FRAME_BYTES,
        });
    }
    Ok(bytes)
}

/// Minimal failure frame used when a response cannot be formatted.
///
/// Carries only the correlation id, the failure status, and a static
/// error message, so it is representable within the frame bound for
/// every possible id and timestamp.
#[must_use]
pub fn fallback_frame(id: u32, timestamp: u64) -> Vec<u8> {
    format!(
        "{{\"id\":{id},\"status\":-1,\"timestamp\":{timestamp},\
         \"error\":\"failed to format response\"}}"
    )
    .into_bytes()
}

fn check_frame(frame: &[u8]) -> Result<&[u8], CodecError> {
    if frame.len() > MAX_FRAME_BYTES {
        return Err(CodecError::FrameTooLarge {
            size: frame.len(),
            max: MAX_FRAME_BYTES,
        });
    }
    let end = frame
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    let start = frame[..end]
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(end);
    let trimmed = &frame[start..end];
    if trimmed.is_empty() {
        return Err(CodecError::EmptyFrame);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::RequestKind;

    use super::*;

    #[test]
    fn decodes_minimal_request() {
        let frame = br#"{"id":1,"type":0}"#;
        let request = decode_request(frame).expect("minimal frame decodes");
        assert_eq!(request.id, 1);
        assert_eq!(request.kind(), Ok(RequestKind::SendCommand));
        assert_eq!(request.app_name, "");
        assert!(!request.require_confirmation);
    }

    #[test]
    fn ignores_unknown_fields() {
        let frame = br#"{"id":1,"type":2,"future_field":"ignored"}"#;
        assert!(decode_request(frame).is_ok());
    }

    #[test]
    fn missing_required_field_is_a_decode_error() {
        let frame = br#"{"type":0,"app_name":"CFE_ES"}"#;
        assert!(matches!(
            decode_request(frame),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let frame = br#"{"id":"one","type":0}"#;
        assert!(matches!(
            decode_request(frame),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_oversized_frame() {
        let frame = vec![b' '; MAX_FRAME_BYTES + 1];
        assert!(matches!(
            decode_request(&frame),
            Err(CodecError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_empty_frame() {
        assert!(matches!(decode_request(b"  \n"), Err(CodecError::EmptyFrame)));
        assert!(matches!(decode_request(b""), Err(CodecError::EmptyFrame)));
    }

    #[test]
    fn request_round_trip_preserves_fields() {
        let request = Request::new(9, RequestKind::ReadFile)
            .with_payload("\"/cf/config.tbl\"")
            .confirmed();
        let frame = encode_request(&request).expect("request encodes");
        let decoded = decode_request(&frame).expect("request decodes");
        assert_eq!(decoded, request);
    }

    #[test]
    fn response_round_trip_preserves_fields() {
        let response = Response::success(4, 1700, json!({"files": []}));
        let decoded = decode_response(&encode_response(&response)).expect("response decodes");
        assert_eq!(decoded, response);
    }

    #[test]
    fn oversized_response_falls_back_to_minimal_frame() {
        let huge = json!({"blob": "x".repeat(MAX_FRAME_BYTES)});
        let response = Response::success(8, 55, huge);
        let frame = encode_response(&response);
        assert!(frame.len() <= MAX_FRAME_BYTES);
        let decoded = decode_response(&frame).expect("fallback decodes");
        assert_eq!(decoded.id(), 8);
        assert_eq!(decoded.timestamp(), 55);
        assert!(!decoded.is_success());
        assert_eq!(decoded.error(), Some("failed to format response"));
    }

    #[test]
    fn fallback_frame_fits_for_extreme_values() {
        let frame = fallback_frame(u32::MAX, u64::MAX);
        assert!(frame.len() <= MAX_FRAME_BYTES);
        assert!(decode_response(&frame).is_ok());
    }
}
