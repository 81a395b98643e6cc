//! Binary wire format of [`VehicleRecord`].
//!
//! Schema v1 is Protocol Buffers (proto3, explicit presence):
//!
//! ```proto
//! message Location { optional uint32 x = 1; optional uint32 y = 2; }
//! message VehicleData {
//!   optional Location location = 1;
//!   optional double speed = 2;
//!   optional bool brake = 3;
//! }
//! ```
//!
//! Every field is always written, in tag order, so a record has exactly one
//! encoding. `decode` accepts only that canonical form, byte for byte: a
//! payload with a missing, unknown, repeated or reordered field is rejected,
//! as are values outside the record constraints.

use prost::Message;

use crate::error::WireError;
use crate::record::{Location, VehicleRecord};

/// Version of the layout documented above.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, PartialEq, Message)]
struct LocationMsg {
    #[prost(uint32, optional, tag = "1")]
    x: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    y: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
struct VehicleData {
    #[prost(message, optional, tag = "1")]
    location: Option<LocationMsg>,
    #[prost(double, optional, tag = "2")]
    speed: Option<f64>,
    #[prost(bool, optional, tag = "3")]
    brake: Option<bool>,
}

impl From<&VehicleRecord> for VehicleData {
    fn from(r: &VehicleRecord) -> Self {
        Self {
            location: Some(LocationMsg {
                x: Some(r.location.x),
                y: Some(r.location.y),
            }),
            speed: Some(r.speed),
            brake: Some(r.brake),
        }
    }
}

impl TryFrom<VehicleData> for VehicleRecord {
    type Error = WireError;

    fn try_from(msg: VehicleData) -> Result<Self, WireError> {
        let location = msg.location.ok_or_else(|| missing("location"))?;
        Ok(VehicleRecord {
            location: Location {
                x: location.x.ok_or_else(|| missing("location.x"))?,
                y: location.y.ok_or_else(|| missing("location.y"))?,
            },
            speed: msg.speed.ok_or_else(|| missing("speed"))?,
            brake: msg.brake.ok_or_else(|| missing("brake"))?,
        })
    }
}

fn missing(field: &str) -> WireError {
    WireError::malformed(format!("missing field {field}"))
}

/// Encodes a record. Out-of-range records are refused before any byte is produced.
pub fn encode(record: &VehicleRecord) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::new();
    encode_into(record, &mut buf)?;
    Ok(buf)
}

/// Like [`encode`], but writes into `buf` (cleared first) so a send loop can
/// reuse one allocation.
pub fn encode_into(record: &VehicleRecord, buf: &mut Vec<u8>) -> Result<(), WireError> {
    record.validate()?;
    buf.clear();
    let msg = VehicleData::from(record);
    buf.reserve(msg.encoded_len());
    msg.encode(buf)
        .map_err(|e| WireError::Serialize(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<VehicleRecord, WireError> {
    let msg = VehicleData::decode(bytes)
        .map_err(|e| WireError::malformed(format!("protobuf decode: {e}")))?;

    // Unknown, duplicated, reordered or over-long fields re-encode differently.
    if msg.encode_to_vec() != bytes {
        return Err(WireError::malformed(format!(
            "non-canonical payload: {} bytes, expected {}",
            bytes.len(),
            msg.encoded_len()
        )));
    }

    let record = VehicleRecord::try_from(msg)?;
    record
        .validate()
        .map_err(|e| WireError::malformed(e.to_string()))?;
    Ok(record)
}
