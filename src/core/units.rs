pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const SECONDS_PER_DAY: u32 = SECONDS_PER_HOUR * HOURS_PER_DAY;
pub const DAYS_PER_WEEK: u32 = 7;

/// Angular frequency (rad/s) of a temperature oscillation with the given period in seconds.
pub fn angular_frequency(period_s: f64) -> f64 {
    2. * std::f64::consts::PI / period_s
}

/// Round a value to the nearest half, e.g. for storey counts averaged over several buildings.
pub fn round_to_nearest_half(value: f64) -> f64 {
    (value * 2.).round() / 2.
}
