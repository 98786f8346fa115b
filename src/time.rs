/// This library uses a continuous time model: core speed factors and
/// bandwidth fractions make execution times non-integral.
pub type Time = f64;

/// Syntactic sugar to give a hint that a time value indicates a
/// point in time or some offset.
pub type Instant = Time;

/// Syntactic sugar to give a hint that a time value denotes an
/// interval length.
pub type Duration = Time;

/// Syntactic sugar to give a hint that a time value represents some
/// amount of processor service.
pub type Service = Time;

/// Tolerance for float accounting in the event-driven simulator:
/// budgets and execution remainders within `TIME_EPS` of zero count
/// as exhausted.
pub const TIME_EPS: Time = 1e-9;

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

/// The least common multiple of a set of periods, rounded to whole
/// time units. Used as the default simulation and demand-analysis
/// horizon.
pub fn hyperperiod(periods: impl IntoIterator<Item = Duration>) -> Duration {
    periods
        .into_iter()
        .map(|p| p.round().max(1.0) as u64)
        .fold(1, lcm) as Duration
}
