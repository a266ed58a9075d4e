//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to lie within `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_deg_360(angle_deg: f64) -> f64 {
    let wrapped = rem_euclid(angle_deg, 360.0);

    // Round-off in rem_euclid can land exactly on 360
    if wrapped >= 360.0 {
        0.0
    }
    else {
        wrapped
    }
}

/// Get the signed angular distance in degrees from `prev_deg` to `curr_deg`.
///
/// The result is the shortest rotation, in the range `(-180, 180]`, so that
/// `prev_deg + result` points the same way as `curr_deg`.
pub fn ang_diff_deg(prev_deg: f64, curr_deg: f64) -> f64 {
    let diff = rem_euclid(curr_deg - prev_deg + 180.0, 360.0) - 180.0;

    if diff <= -180.0 {
        diff + 360.0
    }
    else {
        diff
    }
}

/// Get the circular mean of a set of angles in degrees.
///
/// The mean is the direction of the sum of the unit vectors pointing along
/// each angle, normalised to `[0, 360)`. Arithmetic averaging breaks across the
/// 0/360 wrap (350 and 10 would average to 180).
///
/// Returns `None` if there are no angles.
pub fn circular_mean_deg<'a, I>(angles_deg: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a f64>
{
    let mut num = 0usize;
    let mut resultant = Vector2::<f64>::zeros();

    for a in angles_deg {
        let a_rad = a.to_radians();
        resultant += Vector2::new(a_rad.cos(), a_rad.sin());
        num += 1;
    }

    if num == 0 {
        return None;
    }

    Some(wrap_deg_360(resultant[1].atan2(resultant[0]).to_degrees()))
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((4.5, 1.5), (0.0, 1.0), 3.0), 0.5);
        assert_eq!(lin_map((0.0, 10.0), (-1.0, 1.0), 10.0), 1.0);
    }

    #[test]
    fn test_ang_diff_deg() {
        assert_eq!(ang_diff_deg(10.0, 20.0), 10.0);
        assert_eq!(ang_diff_deg(20.0, 10.0), -10.0);
        assert_eq!(ang_diff_deg(350.0, 10.0), 20.0);
        assert_eq!(ang_diff_deg(10.0, 350.0), -20.0);
        assert_eq!(ang_diff_deg(0.0, 180.0), 180.0);
        assert_eq!(ang_diff_deg(180.0, 0.0), 180.0);
        assert_eq!(ang_diff_deg(0.0, 720.0), 0.0);
        assert_eq!(ang_diff_deg(-90.0, 90.0), 180.0);
    }

    #[test]
    fn test_circular_mean_deg() {
        let m = circular_mean_deg(&[350.0, 10.0]).unwrap();
        assert!(m < EPS || (360.0 - m) < EPS, "mean was {}", m);

        let m = circular_mean_deg(&[80.0, 90.0, 100.0]).unwrap();
        assert!((m - 90.0).abs() < EPS);

        let m = circular_mean_deg(&[-90.0]).unwrap();
        assert!((m - 270.0).abs() < EPS);

        assert!(circular_mean_deg(&Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(-90.0), 270.0);
        assert_eq!(wrap_deg_360(360.0), 0.0);
        assert_eq!(wrap_deg_360(725.0), 5.0);
    }
}
