/// Invalid construction parameters for a ball, surface or simulation.
///
/// Every variant is raised before any stepping happens.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    InvalidMass(f64),
    InvalidRadius(f64),
    InvalidTimeStep(f64),
    InvalidDuration(f64),
    InvalidGravity(f64),
    NegativeFriction(f64),
    InvalidAngle(f64),
    InvalidRestitution(f64),
    InvalidBounds(String),
    NoBalls,
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMass(m) => write!(f, "mass must be positive and finite, got {m}"),
            Self::InvalidRadius(r) => write!(f, "radius must be positive and finite, got {r}"),
            Self::InvalidTimeStep(dt) => write!(f, "time step must be positive and finite, got {dt}"),
            Self::InvalidDuration(t) => {
                write!(f, "total time must be positive and finite, got {t}")
            },
            Self::InvalidGravity(g) => write!(f, "gravity must be non-negative and finite, got {g}"),
            Self::NegativeFriction(mu) => {
                write!(f, "friction coefficient must be non-negative and finite, got {mu}")
            },
            Self::InvalidAngle(a) => {
                write!(f, "surface angle must lie strictly between -90 and 90 degrees, got {a}")
            },
            Self::InvalidRestitution(e) => {
                write!(f, "restitution must lie in [0, 1], got {e}")
            },
            Self::InvalidBounds(m) => write!(f, "invalid surface bounds: {m}"),
            Self::NoBalls => write!(f, "a multi-ball simulation needs at least one ball"),
        }
    }
}

impl std::error::Error for SimError {}

pub(crate) fn ensure_positive(value: f64, err: fn(f64) -> SimError) -> Result<f64, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}

/// Validate a coefficient of restitution.
pub fn validate_restitution(restitution: f64) -> Result<f64, SimError> {
    if (0.0..=1.0).contains(&restitution) {
        Ok(restitution)
    } else {
        Err(SimError::InvalidRestitution(restitution))
    }
}
