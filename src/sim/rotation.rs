use crate::sim::body::Spin;

/// Self-rotation added to every body each frame, in radians.
pub const BASE_ROTATION_RATE: f64 = 0.005;

pub fn advance_rotation(angle: f64, spin: Spin) -> f64 {
    angle + spin.sign() * BASE_ROTATION_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_direction_sets_sign() {
        assert_eq!(advance_rotation(0.0, Spin::Prograde), BASE_ROTATION_RATE);
        assert_eq!(advance_rotation(0.0, Spin::Retrograde), -BASE_ROTATION_RATE);
    }

    #[test]
    fn angle_is_never_wrapped() {
        let mut a = 1.0e6;
        a = advance_rotation(a, Spin::Prograde);
        assert!(a > 1.0e6);
    }
}
