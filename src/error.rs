use super::*;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid address `{address}`: {reason}"))]
    InvalidAddress { address: String, reason: String },

    #[snafu(display("Invalid recipient share: {reason}"))]
    InvalidRecipientShare { reason: String },

    #[snafu(display("Invalid percentage `{input}`"))]
    InvalidPercent { input: String },

    #[snafu(display("Encoding overflow: {field} is {value} (max {max})"))]
    EncodingOverflow {
        field: &'static str,
        value: u128,
        max: u128,
    },

    #[snafu(display("Extranonce size mismatch: expected {expected} bytes, got {actual}"))]
    ExtraNonceSizeMismatch { expected: usize, actual: usize },
}
