// CODATA value used by the initial-condition sets this simulator targets
pub const GRAV_CONST: f64 = 6.67408e-11;

/// Squared separation (m²) below which the force model clamps the distance
/// used in the acceleration sum. Corresponds to bodies closer than 1000 m.
pub const MIN_SEPARATION_SQUARED: f64 = 1.0e6;

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
