use nalgebra::Vector3;

/// Planar containment test, heights are ignored like everywhere else in the
/// movement code.
pub fn in_circle(center: Vector3<f32>, point: Vector3<f32>, radius: f32) -> bool {
    let dx = center.x - point.x;
    let dz = center.z - point.z;
    dx * dx + dz * dz <= radius * radius
}

/// Heading from `from` to `to` in degrees, normalized into `[0, 360)`.
pub fn angle_between(from: Vector3<f32>, to: Vector3<f32>) -> f32 {
    let mut angle = (to.x - from.x).atan2(to.z - from.z).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn in_circle_includes_the_boundary() {
        let center = Vector3::new(0.0, 0.0, 0.0);
        assert!(in_circle(center, Vector3::new(1.0, 0.0, 0.0), 1.0));
        assert!(in_circle(center, Vector3::new(0.6, 0.0, 0.6), 1.0));
        assert!(!in_circle(center, Vector3::new(1.1, 0.0, 0.0), 1.0));
    }

    #[test]
    fn in_circle_ignores_height() {
        let center = Vector3::new(0.0, 50.0, 0.0);
        assert!(in_circle(center, Vector3::new(0.5, 0.0, 0.5), 1.0));
    }

    #[test]
    fn angle_between_cardinal_directions() {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let cases = [
            (Vector3::new(0.0, 0.0, 1.0), 0.0),
            (Vector3::new(1.0, 0.0, 0.0), 90.0),
            (Vector3::new(0.0, 0.0, -1.0), 180.0),
            (Vector3::new(-1.0, 0.0, 0.0), 270.0),
        ];
        for (to, expected) in cases {
            let angle = angle_between(origin, to);
            assert!((angle - expected).abs() < 1e-3, "{to}: {angle} != {expected}");
        }
    }

    #[test]
    fn angle_between_stays_in_the_degree_range() {
        let origin = Vector3::new(3.0, 0.0, -2.0);
        let mut rng = fastrand::Rng::with_seed(17);
        for _ in 0..100 {
            let to = Vector3::new(rng.f32() * 200.0 - 100.0, 0.0, rng.f32() * 200.0 - 100.0);
            let angle = angle_between(origin, to);
            assert!((0.0..360.0).contains(&angle), "{to}: {angle}");
        }
    }
}
