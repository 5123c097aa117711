//! Angle math for reflecting handle orientations.
//!
//! Orientation attributes are animated as unbounded degrees, so a reflected
//! angle has to be expressed as the representative closest to the value it
//! replaces. Otherwise the animation curve would spin through whole turns
//! between the previous key and the new one.
//!
//! ## Conventions
//!
//! - Angles are in degrees.
//! - A reflection across the 0°/180° line maps `θ` to `-θ`; with the extra
//!   half turn it maps `θ` to `180° - θ`.
//! - The two handles of a curve point are 180° apart, so reflecting one
//!   handle onto the other adds a half turn.

/// Reflect an angle, optionally advancing it by a half turn.
///
/// Whole turns are removed toward zero first so the reflection works inside
/// (-360, 360), then added back so the result stays near the input.
pub fn projected_angle(value: f64, rotate180: bool) -> f64 {
    let adjustment = (value / 360.0).trunc() * 360.0;
    let normalized = value - adjustment;

    let from_zero = normalized % 180.0;
    let advance = match (rotate180, normalized >= 0.0) {
        (false, _) => 0.0,
        (true, true) => 180.0,
        (true, false) => -180.0,
    };

    normalized + advance - from_zero * 2.0 + adjustment
}

/// Representative of `projection` (plus or minus a half turn) closest to
/// `original`.
///
/// The half turn accounts for the opposite handle convention. The search
/// then covers the five candidates `p`, `p ± 360(m-1)` and `p ± 360m`, where
/// `m` is the smallest whole number of turns spanning the distance. The
/// first candidate wins ties.
pub fn nearest_equivalent(original: f64, projection: f64) -> f64 {
    let add = (projection + 180.0 - original).abs();
    let sub = (projection - 180.0 - original).abs();
    let p = if add < sub {
        projection + 180.0
    } else {
        projection - 180.0
    };

    let turns = turns_spanning((p - original).abs());
    let candidates = [
        p,
        p + 360.0 * (turns - 1.0),
        p + 360.0 * turns,
        p - 360.0 * (turns - 1.0),
        p - 360.0 * turns,
    ];

    let mut best = candidates[0];
    let mut best_distance = (best - original).abs();
    for candidate in &candidates[1..] {
        let distance = (candidate - original).abs();
        if distance < best_distance {
            best = *candidate;
            best_distance = distance;
        }
    }
    best
}

/// New value for a handle at `original` that mirrors a handle at `reference`
pub fn reflect_handle(original: f64, reference: f64, rotate180: bool) -> f64 {
    nearest_equivalent(original, projected_angle(reference, rotate180))
}

/// Smallest `m >= 0` with `360 * m >= distance`. NaN spans no turns.
fn turns_spanning(distance: f64) -> f64 {
    if distance.is_nan() {
        return 0.0;
    }
    (distance / 360.0).ceil().max(0.0)
}

/// Whether two angles describe the same direction
pub fn same_direction(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = (a - b).rem_euclid(360.0);
    diff < tolerance || 360.0 - diff < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_reflection_without_rotation_negates() {
        assert!(approx_eq(projected_angle(30.0, false), -30.0));
        assert!(approx_eq(projected_angle(-45.0, false), 45.0));
        assert!(approx_eq(projected_angle(0.0, false), 0.0));
    }

    #[test]
    fn test_reflection_with_rotation() {
        // 30° reflected across the vertical line points to 150°
        assert!(approx_eq(projected_angle(30.0, true), 150.0));
        // Negative inputs rotate the other way
        assert!(approx_eq(projected_angle(-30.0, true), -150.0));
    }

    #[test]
    fn test_reflection_keeps_whole_turns() {
        // 390° = one turn + 30°; the turn is re-applied after reflecting
        assert!(approx_eq(projected_angle(390.0, false), 330.0));
        assert!(approx_eq(projected_angle(390.0, true), 510.0));
        assert!(approx_eq(projected_angle(-400.0, false), -320.0));
    }

    #[test]
    fn test_reflection_past_half_turn() {
        // 200° lies past the 180° line: from_zero = 20
        assert!(approx_eq(projected_angle(200.0, false), 160.0));
        assert!(approx_eq(projected_angle(200.0, true), 340.0));
    }

    #[test]
    fn test_nearest_equivalent_adds_half_turn() {
        // The projection of a 10° handle at -10° flips to 170°
        assert!(approx_eq(nearest_equivalent(10.0, -10.0), 170.0));
    }

    #[test]
    fn test_nearest_equivalent_prefers_closest_turn() {
        // Original far up the curve: the result stays within half a turn
        let result = nearest_equivalent(725.0, 10.0);
        assert!(approx_eq(result, 550.0), "got {}", result);
        assert!((result - 725.0).abs() <= 180.0);
    }

    #[test]
    fn test_nearest_equivalent_negative_side() {
        let result = nearest_equivalent(-700.0, 0.0);
        assert!(approx_eq(result, -540.0), "got {}", result);
    }

    #[test]
    fn test_nearest_equivalent_tie_takes_minus_half_turn() {
        // projection == original: +180 and -180 are equally far
        assert!(approx_eq(nearest_equivalent(0.0, 0.0), -180.0));
    }

    #[test]
    fn test_nearest_equivalent_nan_does_not_panic() {
        // Distances are all NaN, so the first candidate is kept
        assert!(approx_eq(nearest_equivalent(f64::NAN, 10.0), -170.0));
    }

    #[test]
    fn test_reflect_handle_in_place() {
        // A 30° handle flipped across the vertical line points to 150°
        assert!(approx_eq(reflect_handle(30.0, 30.0, false), 150.0));
    }

    #[test]
    fn test_same_direction() {
        assert!(same_direction(-180.0, 180.0, 1e-6));
        assert!(same_direction(720.0, 0.0, 1e-6));
        assert!(!same_direction(90.0, -90.0, 1e-6));
    }
}
