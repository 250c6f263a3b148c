//! Coordinate math for placing tracks on a display.
//!
//! Pure, stateless functions shared by the track store (heading
//! normalization on ingestion) and by renderers (world→viewport projection,
//! heading direction vectors).
//!
//! # Conventions
//!
//! - World space is a fixed logical coordinate plane in which entities
//!   report positions, independent of any display size.
//! - Headings are degrees in `[0, 360)` with 0° = up/north, 90° =
//!   right/east, increasing clockwise.
//! - Display space is y-down, matching screen conventions, hence the
//!   negated cosine term in [`heading_vector`].

/// Normalize an angle in degrees to `[0, 360)`.
///
/// Negative inputs wrap upward: `wrap360(-10.0) == 350.0`.
#[inline]
pub fn wrap360(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped < 0.0 {
        // For tiny negatives the addition rounds to exactly 360.0, which
        // would escape [0, 360); the second modulo folds that back to 0.
        (wrapped + 360.0) % 360.0
    } else {
        wrapped
    }
}

/// Project a world-space position onto a viewport.
///
/// Each axis is scaled independently onto `[0, view - 1]`; no aspect-ratio
/// correction is applied. A point at the world's far corner lands on the
/// viewport's last addressable pixel, not one past it.
///
/// # Arguments
///
/// * `x`, `y` - Position in world units
/// * `world_w`, `world_h` - World extent
/// * `view_w`, `view_h` - Viewport extent in pixels
#[inline]
pub fn world_to_display(
    x: f64,
    y: f64,
    world_w: f64,
    world_h: f64,
    view_w: f64,
    view_h: f64,
) -> (f64, f64) {
    let rx = (x / world_w) * (view_w - 1.0);
    let ry = (y / world_h) * (view_h - 1.0);
    (rx, ry)
}

/// Direction vector for a heading, scaled to `length`.
///
/// 0° points up (negative y on a y-down screen), 90° points right.
#[inline]
pub fn heading_vector(heading_deg: f64, length: f64) -> (f64, f64) {
    let theta = heading_deg.to_radians();
    (theta.sin() * length, -theta.cos() * length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap360_identity_in_range() {
        assert_eq!(wrap360(0.0), 0.0);
        assert_eq!(wrap360(90.0), 90.0);
        assert_eq!(wrap360(359.9), 359.9);
    }

    #[test]
    fn test_wrap360_negative() {
        assert_eq!(wrap360(-10.0), 350.0);
        assert_eq!(wrap360(-360.0), 0.0);
        assert_eq!(wrap360(-725.0), 355.0);
    }

    #[test]
    fn test_wrap360_tiny_negative_stays_in_range() {
        let wrapped = wrap360(-1.0e-16);
        assert!((0.0..360.0).contains(&wrapped));
    }

    #[test]
    fn test_wrap360_overflow() {
        assert_eq!(wrap360(360.0), 0.0);
        assert_eq!(wrap360(725.0), 5.0);
        assert_eq!(wrap360(1080.0), 0.0);
    }

    proptest! {
        #[test]
        fn wrap360_always_in_range(deg in -1.0e9f64..1.0e9f64) {
            let wrapped = wrap360(deg);
            prop_assert!((0.0..360.0).contains(&wrapped), "wrap360({}) = {}", deg, wrapped);
        }
    }

    #[test]
    fn test_world_to_display_origin() {
        let (rx, ry) = world_to_display(0.0, 0.0, 800.0, 600.0, 400.0, 300.0);
        assert_eq!(rx, 0.0);
        assert_eq!(ry, 0.0);
    }

    #[test]
    fn test_world_to_display_far_corner() {
        // The far world corner maps onto the last pixel, not one past it.
        let (rx, ry) = world_to_display(800.0, 600.0, 800.0, 600.0, 400.0, 300.0);
        assert_eq!(rx, 399.0);
        assert_eq!(ry, 299.0);
    }

    #[test]
    fn test_world_to_display_axes_independent() {
        // Center of a 800x600 world on a 400x300 view
        let (rx, ry) = world_to_display(400.0, 300.0, 800.0, 600.0, 400.0, 300.0);
        assert!((rx - 199.5).abs() < 1e-9);
        assert!((ry - 149.5).abs() < 1e-9);
    }

    #[test]
    fn test_heading_vector_north() {
        let (vx, vy) = heading_vector(0.0, 20.0);
        assert!(vx.abs() < 1e-9);
        assert!((vy + 20.0).abs() < 1e-9, "north points up (negative y)");
    }

    #[test]
    fn test_heading_vector_east() {
        let (vx, vy) = heading_vector(90.0, 20.0);
        assert!((vx - 20.0).abs() < 1e-9);
        assert!(vy.abs() < 1e-9);
    }

    #[test]
    fn test_heading_vector_south() {
        let (vx, vy) = heading_vector(180.0, 10.0);
        assert!(vx.abs() < 1e-9);
        assert!((vy - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_vector_west() {
        let (vx, vy) = heading_vector(270.0, 10.0);
        assert!((vx + 10.0).abs() < 1e-9);
        assert!(vy.abs() < 1e-9);
    }
}
