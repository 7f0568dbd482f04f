//! Little-endian integer and compact-size ("varint") serialization in the
//! Bitcoin wire convention.

use super::*;

/// Append-only byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Encoder(Vec<u8>);

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.0.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, v);
        self.0.extend_from_slice(&buf);
    }

    pub fn write_u32_le(&mut self, v: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, v);
        self.0.extend_from_slice(&buf);
    }

    pub fn write_u64_le(&mut self, v: u64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, v);
        self.0.extend_from_slice(&buf);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    pub fn write_varint(&mut self, n: u64) {
        match n {
            0..0xfd => self.0.push(n as u8),
            0xfd..=0xffff => {
                self.0.push(0xfd);
                self.write_u16_le(n as u16);
            }
            0x1_0000..=0xffff_ffff => {
                self.0.push(0xfe);
                self.write_u32_le(n as u32);
            }
            _ => {
                self.0.push(0xff);
                self.write_u64_le(n);
            }
        }
    }

    /// Length-prefixed byte string.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

pub fn varint(n: u64) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.write_varint(n);
    encoder.into_bytes()
}

pub fn varint_len(n: u64) -> usize {
    match n {
        0..0xfd => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}
