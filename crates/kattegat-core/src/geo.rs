//! Geographic coordinates for buses.

use crate::units::Degrees;
use serde::{Deserialize, Serialize};

/// A point on the map in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Degrees,
    pub lon: Degrees,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Degrees(lat),
            lon: Degrees(lon),
        }
    }

    /// Whether the point lies in the valid latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat.value())
            && (-180.0..=180.0).contains(&self.lon.value())
    }
}

/// Axis-aligned lat/lon box enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        points.into_iter().fold(None, |acc, p| {
            let (lat, lon) = (p.lat.value(), p.lon.value());
            Some(match acc {
                None => BoundingBox {
                    min_lat: lat,
                    max_lat: lat,
                    min_lon: lon,
                    max_lon: lon,
                },
                Some(b) => BoundingBox {
                    min_lat: b.min_lat.min(lat),
                    max_lat: b.max_lat.max(lat),
                    min_lon: b.min_lon.min(lon),
                    max_lon: b.max_lon.max(lon),
                },
            })
        })
    }

    /// Grow each side by `fraction` of the span (at least `min_degrees`).
    pub fn padded(&self, fraction: f64, min_degrees: f64) -> Self {
        let pad_lat = ((self.max_lat - self.min_lat) * fraction).max(min_degrees);
        let pad_lon = ((self.max_lon - self.min_lon) * fraction).max(min_degrees);
        BoundingBox {
            min_lat: self.min_lat - pad_lat,
            max_lat: self.max_lat + pad_lat,
            min_lon: self.min_lon - pad_lon,
            max_lon: self.max_lon + pad_lon,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_encloses_points() {
        let points = [
            GeoPoint::new(55.6761, 12.5683),
            GeoPoint::new(56.1629, 10.2039),
            GeoPoint::new(57.0488, 9.9217),
        ];
        let bbox = BoundingBox::from_points(points.iter()).unwrap();
        assert_eq!(bbox.min_lat, 55.6761);
        assert_eq!(bbox.max_lat, 57.0488);
        assert_eq!(bbox.min_lon, 9.9217);
        assert_eq!(bbox.max_lon, 12.5683);

        let padded = bbox.padded(0.1, 0.0);
        assert!(padded.min_lat < bbox.min_lat && padded.max_lon > bbox.max_lon);
    }

    #[test]
    fn empty_bounding_box_is_none() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(GeoPoint::new(55.0, 12.0).is_valid());
        assert!(!GeoPoint::new(95.0, 12.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
