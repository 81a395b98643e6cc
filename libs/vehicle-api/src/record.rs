use std::fmt;

use crate::error::WireError;

/// Inclusive upper bound of both location coordinates.
pub const COORD_MAX: u32 = 100;

/// Exclusive upper bound of the speed, km/h.
pub const SPEED_MAX: f64 = 120.0;

/// Position of the vehicle on the 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub x: u32,
    pub y: u32,
}

/// One vehicle sample: location, speed and brake status.
///
/// A plain value without identity or timestamp. The emitter builds one per
/// cycle, encodes it and drops it after the send.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleRecord {
    pub location: Location,
    /// km/h, `[0, SPEED_MAX)`.
    pub speed: f64,
    pub brake: bool,
}

impl VehicleRecord {
    pub fn new(x: u32, y: u32, speed: f64, brake: bool) -> Self {
        Self {
            location: Location { x, y },
            speed,
            brake,
        }
    }

    /// Checks the schema constraints, reporting the first field out of range.
    pub fn validate(&self) -> Result<(), WireError> {
        check_coord("location.x", self.location.x)?;
        check_coord("location.y", self.location.y)?;
        if !self.speed.is_finite() || !(0.0..SPEED_MAX).contains(&self.speed) {
            return Err(WireError::Encoding {
                field: "speed",
                value: self.speed.to_string(),
                range: "[0, 120)",
            });
        }
        Ok(())
    }
}

fn check_coord(field: &'static str, value: u32) -> Result<(), WireError> {
    if value > COORD_MAX {
        return Err(WireError::Encoding {
            field,
            value: value.to_string(),
            range: "[0, 100]",
        });
    }
    Ok(())
}

impl fmt::Display for VehicleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={}, y={}, speed={}, brake={}",
            self.location.x, self.location.y, self.speed, self.brake
        )
    }
}
