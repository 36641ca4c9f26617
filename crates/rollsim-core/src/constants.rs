//! Physical defaults and the numeric thresholds used by the dynamics model.

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Moment of inertia factor for a solid sphere (I = k·m·r²).
pub const SOLID_SPHERE_INERTIA_FACTOR: f64 = 0.4;

/// Fraction of the downslope gravity force that static friction must supply
/// to keep a solid sphere rolling without slipping.
pub const ROLLING_FRICTION_FRACTION: f64 = 2.0 / 7.0;

/// Rolling acceleration of a solid sphere as a fraction of g·sinθ.
pub const ROLLING_ACCELERATION_FRACTION: f64 = 5.0 / 7.0;

/// Slopes flatter than this (radians) are treated as horizontal.
pub const ANGLE_EPSILON: f64 = 1e-6;

/// Speed below which the slipping branch has no direction of motion and
/// friction falls back to opposing the downslope direction.
pub const VELOCITY_EPSILON: f64 = 1e-10;

/// Speed below which a ball on a flat surface feels no rolling resistance.
pub const ROLLING_VELOCITY_EPSILON: f64 = 1e-8;

/// Radius below which angular acceleration is forced to zero.
pub const RADIUS_EPSILON: f64 = 1e-10;

/// Linear and angular speed below which a ball is considered at rest.
pub const REST_EPSILON: f64 = 1e-6;

/// Contact-point speed above which a ball is considered to slip.
pub const CONTACT_SLIP_EPSILON: f64 = 1e-6;

/// Centre distance below which two balls are treated as coincident.
pub const DISTANCE_EPSILON: f64 = 1e-12;

/// Energy scale below which conservation checks pass trivially.
pub const ENERGY_EPSILON: f64 = 1e-12;
