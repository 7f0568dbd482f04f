use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }
}

impl Serialize for Extranonce {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Extranonce {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Stand-in for the extranonce bytes at build time. Only its length matters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraNoncePlaceholder(Vec<u8>);

impl ExtraNoncePlaceholder {
    const PATTERN: [u8; 8] = [0xf0, 0x00, 0x00, 0x0f, 0xf1, 0x11, 0x11, 0x1f];

    pub fn with_len(len: usize) -> Self {
        Self(Self::PATTERN.iter().copied().cycle().take(len).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for ExtraNoncePlaceholder {
    fn default() -> Self {
        Self(Self::PATTERN.to_vec())
    }
}

/// Hands out a distinct `extranonce1` to every session of a job epoch.
#[derive(Debug)]
pub struct ExtraNonceCounter {
    next: AtomicU32,
    enonce2_size: usize,
}

impl ExtraNonceCounter {
    pub fn new(start: u32, enonce2_size: usize) -> Self {
        Self {
            next: AtomicU32::new(start),
            enonce2_size,
        }
    }

    /// Fails once the 32-bit space is used up rather than wrapping around to
    /// values already handed out.
    pub fn next(&self) -> Result<Extranonce> {
        let value = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| next.checked_add(1))
            .map_err(|_| Error::EncodingOverflow {
                field: "extranonce1 counter",
                value: u128::from(u32::MAX) + 1,
                max: u32::MAX.into(),
            })?;

        Ok(Extranonce::from_bytes(&value.to_be_bytes()))
    }

    pub fn enonce1_size(&self) -> usize {
        ENONCE1_SIZE
    }

    pub fn enonce2_size(&self) -> usize {
        self.enonce2_size
    }

    pub fn placeholder(&self) -> ExtraNoncePlaceholder {
        ExtraNoncePlaceholder::with_len(self.enonce1_size() + self.enonce2_size)
    }
}
