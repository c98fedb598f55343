//! Wire framing for the plotter's serial protocol.
//!
//! A message is `[name_len, name.., payload_len, payload.., msg_id]`, COBS
//! encoded and terminated by a single zero byte.

use crate::device::types::DeviceError;

pub const DELIMITER: u8 = 0;

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub payload: Vec<u8>,
    pub id: u8,
}

impl Frame {
    pub fn new(name: impl Into<String>, payload: Vec<u8>, id: u8) -> Self {
        Self {
            name: name.into(),
            payload,
            id,
        }
    }

    /// Encodes the frame for the wire, including the trailing delimiter.
    pub fn encode(&self) -> Result<Vec<u8>, DeviceError> {
        let name = self.name.as_bytes();
        let name_len = u8::try_from(name.len())
            .map_err(|_| DeviceError::Protocol(format!("command name too long: {}", self.name)))?;
        let payload_len = u8::try_from(self.payload.len())
            .map_err(|_| DeviceError::Protocol("payload too long".to_string()))?;

        let mut raw = Vec::with_capacity(name.len() + self.payload.len() + 3);
        raw.push(name_len);
        raw.extend_from_slice(name);
        raw.push(payload_len);
        raw.extend_from_slice(&self.payload);
        raw.push(self.id);

        let mut encoded = cobs_encode(&raw);
        encoded.push(DELIMITER);
        Ok(encoded)
    }

    /// Decodes one frame (without its delimiter).
    pub fn decode(bytes: &[u8]) -> Result<Self, DeviceError> {
        let raw = cobs_decode(bytes)?;
        let malformed = || DeviceError::Protocol(format!("malformed frame ({} bytes)", raw.len()));

        let name_len = *raw.first().ok_or_else(malformed)? as usize;
        let name_end = 1 + name_len;
        let name = raw.get(1..name_end).ok_or_else(malformed)?;
        let payload_len = *raw.get(name_end).ok_or_else(malformed)? as usize;
        let payload_start = name_end + 1;
        let payload = raw
            .get(payload_start..payload_start + payload_len)
            .ok_or_else(malformed)?;
        let id = *raw.get(payload_start + payload_len).ok_or_else(malformed)?;

        Ok(Self {
            name: String::from_utf8_lossy(name).into_owned(),
            payload: payload.to_vec(),
            id,
        })
    }
}

/// Payload for a `go` command: two little-endian f32 coordinates.
pub fn move_payload(x: f64, y: f64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8);
    payload.extend_from_slice(&(x as f32).to_le_bytes());
    payload.extend_from_slice(&(y as f32).to_le_bytes());
    payload
}

/// Payload for a `servo` command: the pulse level as a little-endian f32.
pub fn servo_payload(level: u16) -> Vec<u8> {
    (level as f32).to_le_bytes().to_vec()
}

fn cobs_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 254 + 2);
    let mut code_index = 0;
    let mut code: u8 = 1;
    out.push(0);

    for &byte in data {
        if byte == 0 {
            out[code_index] = code;
            code_index = out.len();
            out.push(0);
            code = 1;
        } else {
            out.push(byte);
            code += 1;
            if code == 0xFF {
                out[code_index] = code;
                code_index = out.len();
                out.push(0);
                code = 1;
            }
        }
    }

    out[code_index] = code;
    out
}

fn cobs_decode(data: &[u8]) -> Result<Vec<u8>, DeviceError> {
    let mut out = Vec::with_capacity(data.len());
    let mut index = 0;

    while index < data.len() {
        let code = data[index] as usize;
        if code == 0 {
            return Err(DeviceError::Protocol("unexpected zero byte in frame".into()));
        }
        index += 1;

        let end = index + code - 1;
        if end > data.len() {
            return Err(DeviceError::Protocol("truncated frame".into()));
        }
        out.extend_from_slice(&data[index..end]);
        index = end;

        if code < 0xFF && index < data.len() {
            out.push(0);
        }
    }

    Ok(out)
}
