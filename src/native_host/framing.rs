//! Chrome native messaging framing: a 4-byte little-endian length followed by
//! that many bytes of UTF-8 JSON.

use crate::constants::MAX_MESSAGE_SIZE;
use serde::Serialize;
use std::io::{self, Read, Write};

/// Read one frame body. A clean end of input surfaces as `UnexpectedEof`.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Serialize `message` and write it as a single flushed frame.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Message too large: {} bytes (max: {MAX_MESSAGE_SIZE} bytes)", json.len()),
        ));
    }
    let len = u32::try_from(json.len())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut bytes = u32::try_from(body.len()).unwrap().to_le_bytes().to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_length_prefix_is_little_endian() {
        let mut out = Vec::new();
        write_message(&mut out, &json!({"type": "startup"})).unwrap();

        let body = br#"{"type":"startup"}"#;
        assert_eq!(&out[..4], &[18, 0, 0, 0]);
        assert_eq!(&out[4..], body);
    }

    #[test]
    fn test_reads_consecutive_frames() {
        let mut bytes = frame(br#"{"a":1}"#);
        bytes.extend(frame(br#"{"b":2}"#));
        let mut reader = Cursor::new(bytes);

        assert_eq!(read_frame(&mut reader).unwrap(), br#"{"a":1}"#);
        assert_eq!(read_frame(&mut reader).unwrap(), br#"{"b":2}"#);
        let err = read_frame(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_rejects_oversized_frame() {
        let len = u32::try_from(MAX_MESSAGE_SIZE + 1).unwrap();
        let mut reader = Cursor::new(len.to_le_bytes().to_vec());

        let err = read_frame(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_body_is_eof() {
        let mut bytes = frame(br#"{"type":"startup"}"#);
        bytes.truncate(10);
        let mut reader = Cursor::new(bytes);

        let err = read_frame(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
