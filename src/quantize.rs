//! Pure quantization of face parameters onto a uniform per-axis partition (§4.1).
//!
//! Quantization is idempotent and monotonic non-decreasing in its input, is
//! deterministic for fixed `(min, max, num_buckets)`, leaves absent axes
//! absent, and rejects non-finite input as [`CoreError::InvalidParameter`].

use crate::contracts::ReplicateRequest;
use crate::error::CoreError;
use crate::params::ALL_AXES;

/// Quantizes one scalar onto `num_buckets` uniform partitions of `[min, max]`.
pub fn quantize_axis(v: f64, min: f64, max: f64, num_buckets: u32) -> Result<f64, CoreError> {
    if !v.is_finite() {
        return Err(CoreError::InvalidParameter(format!("non-finite value: {v}")));
    }
    if num_buckets == 0 {
        return Err(CoreError::InvalidParameter("num_buckets must be positive".to_string()));
    }

    let bucket_size = (max - min) / num_buckets as f64;
    let i = ((v - min) / bucket_size).round();
    let q = (min + i * bucket_size).clamp(min, max);
    Ok((q * 100.0).round() / 100.0)
}

/// Quantizes every present axis of `params`, leaving absent axes absent and
/// transport fields untouched.
pub fn quantize(params: &ReplicateRequest, num_buckets: u32) -> Result<ReplicateRequest, CoreError> {
    let mut out = params.clone();
    for axis in ALL_AXES {
        if let Some(v) = axis.get(params) {
            let quantized = quantize_axis(v, axis.min, axis.max, num_buckets)?;
            axis.set(&mut out, Some(quantized));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SMILE;

    #[test]
    fn seed_scenario_smile_point_four_two() {
        let q = quantize_axis(0.42, SMILE.min, SMILE.max, 6).unwrap();
        assert_eq!(q, 0.5);
    }

    #[test]
    fn quantize_is_idempotent() {
        let once = quantize_axis(7.3, -20.0, 20.0, 6).unwrap();
        let twice = quantize_axis(once, -20.0, 20.0, 6).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn quantize_is_monotonic_non_decreasing() {
        let mut prev = f64::NEG_INFINITY;
        let mut v = -20.0;
        while v <= 20.0 {
            let q = quantize_axis(v, -20.0, 20.0, 6).unwrap();
            assert!(q >= prev);
            prev = q;
            v += 0.37;
        }
    }

    #[test]
    fn endpoints_are_fixed_points() {
        for v in [-20.0, 20.0] {
            let q = quantize_axis(v, -20.0, 20.0, 6).unwrap();
            assert_eq!(q, v);
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(matches!(
            quantize_axis(f64::NAN, -20.0, 20.0, 6),
            Err(CoreError::InvalidParameter(_))
        ));
        assert!(matches!(
            quantize_axis(f64::INFINITY, -20.0, 20.0, 6),
            Err(CoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn absent_axis_stays_absent() {
        let req = ReplicateRequest::new("https://example.com/a.jpg".to_string());
        let out = quantize(&req, 6).unwrap();
        assert!(out.smile.is_none());
        assert!(out.wink.is_none());
    }
}
