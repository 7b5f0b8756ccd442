//! Cartesian/spherical conversions and vector utilities.

/// Floor below which a position is treated as coincident with the origin.
pub const DISTANCE_EPSILON: f32 = 1e-9;

/// A right-handed Cartesian position in meters: +X right, +Y up, +Z front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cartesian {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Cartesian {
    pub const ORIGIN: Cartesian = Cartesian { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Cartesian) -> Cartesian {
        Cartesian::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Azimuth (radians, 0 = +Z/front, +pi/2 = +X/right), elevation (radians,
/// 0 = horizon, +pi/2 = up), and distance (meters) derived from a Cartesian
/// position relative to the listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
}

/// Converts a Cartesian position to spherical coordinates.
///
/// When `distance < DISTANCE_EPSILON` the direction is undefined; this
/// returns the zero direction (front, `azimuth = elevation = 0`) and logs
/// at debug level.
pub fn to_spherical(p: Cartesian) -> Spherical {
    let distance = p.length();

    if distance < DISTANCE_EPSILON {
        log::debug!("source at or near the origin (distance = {distance}); using front direction");
        return Spherical {
            azimuth: 0.0,
            elevation: 0.0,
            distance,
        };
    }

    let azimuth = p.x.atan2(p.z);
    let elevation = (p.y / distance.max(DISTANCE_EPSILON)).clamp(-1.0, 1.0).asin();

    Spherical {
        azimuth,
        elevation,
        distance,
    }
}
