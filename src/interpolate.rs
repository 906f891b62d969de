use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Straight-line interpolation in degree space. Good enough at city scale
/// between adjacent stations. `t` is used as given, so values outside
/// `[0, 1]` extrapolate along the same line.
pub fn interpolate(from: LatLng, to: LatLng, t: f64) -> LatLng {
    LatLng {
        lat: from.lat + (to.lat - from.lat) * t,
        lng: from.lng + (to.lng - from.lng) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const A: LatLng = LatLng::new(35.6812, 139.7671);
    const B: LatLng = LatLng::new(35.6896, 139.7006);

    #[test]
    fn test_endpoints_are_exact() {
        assert_eq!(interpolate(A, B, 0.0), A);
        assert_eq!(interpolate(A, B, 1.0), B);
    }

    #[test]
    fn test_midpoint() {
        let mid = interpolate(LatLng::new(35.0, 139.0), LatLng::new(35.1, 139.1), 0.5);
        assert_relative_eq!(mid.lat, 35.05, epsilon = 1e-12);
        assert_relative_eq!(mid.lng, 139.05, epsilon = 1e-12);
    }

    #[test]
    fn test_does_not_clamp() {
        for t in [-0.5, 0.25, 1.5, 2.0] {
            let p = interpolate(A, B, t);
            assert_relative_eq!(p.lat, A.lat + t * (B.lat - A.lat), epsilon = 1e-12);
            assert_relative_eq!(p.lng, A.lng + t * (B.lng - A.lng), epsilon = 1e-12);
        }
    }
}
