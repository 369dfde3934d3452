//! Declared ranges for each face expression parameter axis (data model §3).
//!
//! `wink` is treated like every other axis with an explicit range, resolving
//! the open question about its inconsistent handling upstream: here it is
//! always included in quantization, key derivation, and sweeps.

use crate::contracts::ReplicateRequest;

/// One scalar axis of `FaceParameters`, with its declared inclusive range.
#[derive(Debug, Clone, Copy)]
pub struct Axis {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const ROTATE_PITCH: Axis = Axis { name: "rotate_pitch", min: -20.0, max: 20.0 };
pub const ROTATE_YAW: Axis = Axis { name: "rotate_yaw", min: -20.0, max: 20.0 };
pub const ROTATE_ROLL: Axis = Axis { name: "rotate_roll", min: -20.0, max: 20.0 };
pub const PUPIL_X: Axis = Axis { name: "pupil_x", min: -15.0, max: 15.0 };
pub const PUPIL_Y: Axis = Axis { name: "pupil_y", min: -15.0, max: 15.0 };
pub const SMILE: Axis = Axis { name: "smile", min: -0.3, max: 1.3 };
pub const BLINK: Axis = Axis { name: "blink", min: -20.0, max: 5.0 };
pub const EYEBROW: Axis = Axis { name: "eyebrow", min: -10.0, max: 15.0 };
pub const WINK: Axis = Axis { name: "wink", min: -20.0, max: 5.0 };

/// All nine axes, in the order they appear in the data model table.
pub const ALL_AXES: [Axis; 9] = [
    ROTATE_PITCH,
    ROTATE_YAW,
    ROTATE_ROLL,
    PUPIL_X,
    PUPIL_Y,
    SMILE,
    BLINK,
    EYEBROW,
    WINK,
];

/// The three rotation axes that make up the full-sweep Cartesian product.
pub const ROTATION_AXES: [Axis; 3] = [ROTATE_PITCH, ROTATE_YAW, ROTATE_ROLL];

impl Axis {
    /// Reads this axis's current value out of a wire-format payload.
    pub fn get(&self, req: &ReplicateRequest) -> Option<f64> {
        match self.name {
            "rotate_pitch" => req.rotate_pitch,
            "rotate_yaw" => req.rotate_yaw,
            "rotate_roll" => req.rotate_roll,
            "pupil_x" => req.pupil_x,
            "pupil_y" => req.pupil_y,
            "smile" => req.smile,
            "blink" => req.blink,
            "eyebrow" => req.eyebrow,
            "wink" => req.wink,
            other => unreachable!("unknown axis {other}"),
        }
    }

    /// Writes a new value for this axis into a wire-format payload.
    pub fn set(&self, req: &mut ReplicateRequest, value: Option<f64>) {
        match self.name {
            "rotate_pitch" => req.rotate_pitch = value,
            "rotate_yaw" => req.rotate_yaw = value,
            "rotate_roll" => req.rotate_roll = value,
            "pupil_x" => req.pupil_x = value,
            "pupil_y" => req.pupil_y = value,
            "smile" => req.smile = value,
            "blink" => req.blink = value,
            "eyebrow" => req.eyebrow = value,
            "wink" => req.wink = value,
            other => unreachable!("unknown axis {other}"),
        }
    }

    /// The `num_buckets + 1` representable endpoints of this axis's uniform
    /// partition, rounded the same way the quantizer rounds its output.
    pub fn endpoints(&self, num_buckets: u32) -> Vec<f64> {
        let bucket_size = (self.max - self.min) / num_buckets as f64;
        (0..=num_buckets)
            .map(|i| round2(self.min + i as f64 * bucket_size))
            .collect()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_count_matches_num_buckets_plus_one() {
        assert_eq!(SMILE.endpoints(6).len(), 7);
    }

    #[test]
    fn endpoints_span_the_declared_range() {
        let endpoints = ROTATE_PITCH.endpoints(4);
        assert_eq!(endpoints.first(), Some(&-20.0));
        assert_eq!(endpoints.last(), Some(&20.0));
    }

    #[test]
    fn get_and_set_round_trip_through_the_wire_struct() {
        let mut req = ReplicateRequest::new("img".to_string());
        WINK.set(&mut req, Some(-4.5));
        assert_eq!(WINK.get(&req), Some(-4.5));
    }
}
