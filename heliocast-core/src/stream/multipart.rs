//! Multipart replace-stream part encoding
//!
//! Each part is a boundary marker, a content-type header, and the raw
//! payload, so a browser `<img>` pointed at the stream renders each part as
//! it arrives, replacing the previous one.

use bytes::{BufMut, Bytes, BytesMut};

/// Boundary token shared by every part and the response content type.
pub const BOUNDARY: &str = "frame";

/// Content type for the outer HTTP response.
pub const MIME_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const DIAGNOSTIC_CONTENT_TYPE: &str = "text/plain";

/// Encode a single part: `--frame`, content-type header, blank line,
/// payload, trailing CRLF.
fn encode_part(content_type: &str, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(payload.len() + content_type.len() + 32);
    buf.put_slice(b"--");
    buf.put_slice(BOUNDARY.as_bytes());
    buf.put_slice(b"\r\nContent-Type: ");
    buf.put_slice(content_type.as_bytes());
    buf.put_slice(b"\r\n\r\n");
    buf.put_slice(payload);
    buf.put_slice(b"\r\n");
    buf.freeze()
}

/// Encode one image frame part.
#[must_use]
pub fn image_part(payload: &[u8]) -> Bytes {
    encode_part(IMAGE_CONTENT_TYPE, payload)
}

/// Encode a text diagnostic part, substituted for image content to report a
/// terminal failure without breaking the streaming protocol.
#[must_use]
pub fn diagnostic_part(message: &str) -> Bytes {
    encode_part(DIAGNOSTIC_CONTENT_TYPE, message.as_bytes())
}
