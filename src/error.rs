//! Error types for the backdrop.
//!
//! Construction-time problems (bad profiles, unreadable config) and
//! render-surface failures are reported through [`SceneError`]. Nothing in a
//! running frame loop is expected to fail except presentation.

use std::path::PathBuf;

/// Errors raised while loading a configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected schema
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors produced by scene construction, lifecycle and presentation.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A tree, particle or interaction profile value is out of range.
    /// Values are never clamped; the offending field is named instead.
    #[error("invalid profile field `{field}`: {reason}")]
    InvalidProfile { field: String, reason: String },

    /// The host cannot provide a rendering context.
    #[error("rendering unavailable: {0}")]
    RenderUnavailable(String),

    /// Presenting a frame to the surface failed.
    #[error("surface error: {0}")]
    Surface(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SceneError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SceneError::InvalidProfile {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;

/// Reject negative or non-finite values.
pub(crate) fn ensure_non_negative(field: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SceneError::invalid(
            field,
            format!("expected a finite non-negative value, got {value}"),
        ));
    }
    Ok(())
}

/// Reject a `[min, max]` pair that is inverted, non-finite, or whose
/// span `max - min` overflows.
pub(crate) fn ensure_ordered(field: &str, min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(SceneError::invalid(
            field,
            format!("expected min <= max, got [{min}, {max}]"),
        ));
    }
    if !(max - min).is_finite() {
        return Err(SceneError::invalid(
            field,
            format!("span of [{min}, {max}] is not finite"),
        ));
    }
    Ok(())
}

/// Phases live in `[0, 2π)`.
pub(crate) fn ensure_phase(field: &str, phase: f32) -> Result<()> {
    if !(0.0..std::f32::consts::TAU).contains(&phase) {
        return Err(SceneError::invalid(
            field,
            format!("phase {phase} is outside [0, 2π)"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_accepts_zero() {
        assert!(ensure_non_negative("radius", 0.0).is_ok());
        assert!(ensure_non_negative("radius", 1.5).is_ok());
    }

    #[test]
    fn non_negative_rejects_negative_and_nan() {
        let err = ensure_non_negative("trunk.height", -1.0).unwrap_err();
        assert!(err.to_string().contains("trunk.height"));
        assert!(ensure_non_negative("radius", f32::NAN).is_err());
    }

    #[test]
    fn ordered_rejects_inverted_range() {
        assert!(ensure_ordered("fall_speed", 0.01, 0.03).is_ok());
        assert!(ensure_ordered("fall_speed", 0.02, 0.02).is_ok());
        assert!(ensure_ordered("fall_speed", 0.03, 0.01).is_err());
    }

    #[test]
    fn ordered_rejects_overflowing_span() {
        assert!(ensure_ordered("spawn.x", -3.0e38, 3.0e38).is_err());
        assert!(ensure_ordered("spawn.x", -1.0e38, 1.0e38).is_ok());
    }

    #[test]
    fn phase_is_half_open() {
        assert!(ensure_phase("phase", 0.0).is_ok());
        assert!(ensure_phase("phase", 6.28).is_ok());
        assert!(ensure_phase("phase", std::f32::consts::TAU).is_err());
        assert!(ensure_phase("phase", -0.1).is_err());
    }
}
