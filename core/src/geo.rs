// core/src/geo.rs
use crate::models::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0; // middelradius (m)

// --- RoundTo trait (offentlig, brukt ved frysing av den endelige posten) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Storsirkelavstand (haversine) i meter mellom to punkter.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    let d = EARTH_RADIUS_M * c;
    if d.is_finite() { d } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let p = GeoPoint { lat: 59.91, lon: 10.75 };
        assert!(haversine_m(p, p).abs() < 1e-9);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        // 1 grad breddegrad ≈ 111.2 km
        let a = GeoPoint { lat: 59.0, lon: 10.0 };
        let b = GeoPoint { lat: 60.0, lon: 10.0 };
        let d = haversine_m(a, b);
        assert!((d - 111_195.0).abs() < 200.0, "fikk {d}");
    }

    #[test]
    fn round_to_two_decimals() {
        assert_eq!(3.14159.round_to(2), 3.14);
    }
}
