use thiserror::Error;

/// Which coordinate space a spacing check failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSpace {
    Pixel,
    Geo,
}

impl PointSpace {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pixel => "pixel",
            Self::Geo => "geographic",
        }
    }
}

/// Failures surfaced by validation, fitting and geometry checks.
///
/// Every variant is recoverable: a rejected fit leaves no engine state behind,
/// the host asks the user to pick points again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("expected 2 to 4 control points, got {0}")]
    WrongPointCount(usize),

    #[error(
        "{} points #{first} and #{second} are too close ({distance:.6} < {minimum})",
        space.label()
    )]
    PointsTooClose {
        space: PointSpace,
        first: u32,
        second: u32,
        distance: f64,
        minimum: f64,
    },

    #[error("control point set is full ({0} points)")]
    CapacityExceeded(usize),

    #[error("degenerate configuration: {0}")]
    DegenerateConfiguration(String),
}

impl GeoError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidCoordinate(what.into())
    }

    pub(crate) fn degenerate(what: impl Into<String>) -> Self {
        Self::DegenerateConfiguration(what.into())
    }
}

/// Validation failures share the same type as solver failures.
pub type ValidationError = GeoError;

pub type GeoResult<T> = Result<T, GeoError>;
