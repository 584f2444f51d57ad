//! Axis calibration helpers

use crate::error::{require_positive, ParameterResult};

/// Corrected steps-per-mm after commanding `target` mm and measuring `actual` mm
///
/// `current * target / actual`: an axis that travelled too far gets fewer
/// steps, one that fell short gets more.
pub fn calibrate_steps_per_mm(current: f64, target: f64, actual: f64) -> ParameterResult<f64> {
    require_positive("current", current)?;
    require_positive("target", target)?;
    require_positive("actual", actual)?;

    let steps = current / actual * target;
    tracing::debug!(current, target, actual, steps, "Calibrated steps per mm");
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overshoot_reduces_steps() {
        let steps = calibrate_steps_per_mm(80.0, 25.0, 26.0).unwrap();
        assert!(steps < 80.0);
        assert!((steps - 76.923).abs() < 1e-3);
    }

    #[test]
    fn test_exact_travel_keeps_steps() {
        assert_eq!(calibrate_steps_per_mm(400.0, 25.0, 25.0).unwrap(), 400.0);
    }

    #[test]
    fn test_zero_actual_is_rejected() {
        assert!(calibrate_steps_per_mm(80.0, 25.0, 0.0).is_err());
        assert!(calibrate_steps_per_mm(80.0, 25.0, -3.0).is_err());
    }
}
