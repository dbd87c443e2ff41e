use std::f32::consts::PI;

use crate::{CartesianPoint, SphericalRecord};

pub const DEG_TO_RAD: f32 = PI / 180.;

/// Maps a sensor measurement into the cartesian frame.
///
/// The polar angle (`y_angle_deg`) is measured from the y-axis, the azimuth (`x_angle_deg`)
/// rotates within the x-z plane starting at the x-axis. Distances are taken as they are.
pub fn transform(record: SphericalRecord) -> CartesianPoint {
    let azimuth = DEG_TO_RAD * record.x_angle_deg;
    let polar = DEG_TO_RAD * record.y_angle_deg;
    let d = record.distance_m;

    let (polar_sin, polar_cos) = polar.sin_cos();
    let (azimuth_sin, azimuth_cos) = azimuth.sin_cos();

    CartesianPoint {
        scan_number: record.scan_number,
        x: d * polar_sin * azimuth_cos,
        y: d * polar_cos,
        z: d * polar_sin * azimuth_sin,
        intensity: record.intensity,
    }
}

impl From<SphericalRecord> for CartesianPoint {
    fn from(value: SphericalRecord) -> Self {
        transform(value)
    }
}
