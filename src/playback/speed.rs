/// Speed multiplier that makes a route lasting `total_required_secs` play
/// back in `desired_eta_minutes`.
///
/// An ETA of zero means real time (1.0). A route with no duration yields
/// 0.0, which still completes on the first tick.
pub fn compute_speed(total_required_secs: f64, desired_eta_minutes: f64) -> f64 {
    if desired_eta_minutes == 0.0 {
        1.0
    } else {
        total_required_secs / (desired_eta_minutes * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_eta_is_real_time() {
        assert_eq!(compute_speed(3600.0, 0.0), 1.0);
        assert_eq!(compute_speed(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_eta_scales_speed() {
        // 60 minute route squeezed into 30 minutes
        assert_eq!(compute_speed(3600.0, 30.0), 2.0);
        // and stretched to 120
        assert_eq!(compute_speed(3600.0, 120.0), 0.5);
    }

    #[test]
    fn test_zero_duration_route() {
        assert_eq!(compute_speed(0.0, 10.0), 0.0);
    }
}
