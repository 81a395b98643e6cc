pub mod error;
pub mod record;
pub mod wire;

pub use error::WireError;
pub use record::{Location, VehicleRecord, COORD_MAX, SPEED_MAX};
pub use wire::{decode, encode, encode_into, SCHEMA_VERSION};
