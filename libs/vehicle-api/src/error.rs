/// Errors of the vehicle record codec.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A record violates the schema constraints and must not be put on the wire.
    #[error("encoding: {field} = {value} outside {range}")]
    Encoding {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    /// The protobuf encoder refused a valid record.
    #[error("encoding: protobuf: {0}")]
    Serialize(String),

    /// Bytes do not match schema v1.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl WireError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_failure_is_not_a_decode_error() {
        let err = WireError::Serialize("buffer full".into());
        assert!(!err.is_malformed());
        assert_eq!(err.to_string(), "encoding: protobuf: buffer full");
    }
}
