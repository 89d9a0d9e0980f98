//! Map view: static bus markers plus line overlays redrawn per result.
//!
//! Markers are fixed for the lifetime of the view. Overlays belong to one
//! [`ResultSet`] at a time; [`MapView::set_overlays`] replaces them wholesale
//! and [`MapView::clear_overlays`] drops them, so stale flows never linger.

use kattegat_core::{BoundingBox, GeoPoint};
use kattegat_scenarios::{ResultSet, Topology};
use serde::Serialize;
use serde_json::{json, Value};

pub const DEFAULT_WIDTH: usize = 60;
pub const DEFAULT_HEIGHT: usize = 20;

const MIN_WIDTH: usize = 20;
const MIN_HEIGHT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    pub location: GeoPoint,
    pub technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOverlay {
    pub line: String,
    pub from: String,
    pub to: String,
    pub from_location: GeoPoint,
    pub to_location: GeoPoint,
    /// Signed, positive from `from` to `to`
    pub flow_mw: f64,
    pub loading_percent: Option<f64>,
}

impl LineOverlay {
    /// "Aarhus -> Aalborg 22.2 MW", oriented along the actual flow.
    pub fn describe(&self) -> String {
        let (src, dst) = if self.flow_mw >= 0.0 {
            (&self.from, &self.to)
        } else {
            (&self.to, &self.from)
        };
        let mut text = format!("{} -> {} {:.1} MW", src, dst, self.flow_mw.abs());
        if let Some(p) = self.loading_percent {
            text.push_str(&format!(" ({:.0}%)", p));
        }
        text
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapView {
    markers: Vec<Marker>,
    overlays: Vec<LineOverlay>,
}

impl MapView {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            overlays: Vec::new(),
        }
    }

    /// One marker per site, labelled with its technology.
    pub fn from_topology(topology: &Topology) -> Self {
        Self::new(
            topology
                .sites
                .iter()
                .map(|s| Marker {
                    name: s.name.clone(),
                    location: s.location,
                    technology: Some(s.technology.clone()),
                })
                .collect(),
        )
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn overlays(&self) -> &[LineOverlay] {
        &self.overlays
    }

    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    /// Replace every overlay with the lines of `result`. Lines whose
    /// endpoints have no known coordinates are skipped.
    pub fn set_overlays(&mut self, result: &ResultSet) {
        self.clear_overlays();
        for (line, flow) in result.line_flows() {
            let Some((from, to)) = result.line_buses().get(line) else {
                continue;
            };
            let (Some(from_location), Some(to_location)) =
                (self.locate(result, from), self.locate(result, to))
            else {
                continue;
            };
            self.overlays.push(LineOverlay {
                line: line.clone(),
                from: from.clone(),
                to: to.clone(),
                from_location,
                to_location,
                flow_mw: *flow,
                loading_percent: result.line_loading_percent(line),
            });
        }
    }

    fn locate(&self, result: &ResultSet, bus: &str) -> Option<GeoPoint> {
        result.bus_coordinates().get(bus).copied().or_else(|| {
            self.markers
                .iter()
                .find(|m| m.name == bus)
                .map(|m| m.location)
        })
    }

    /// Equirectangular ASCII rendering of the padded marker bounding box,
    /// followed by one legend row per overlay.
    pub fn render_ascii(&self, width: usize, height: usize) -> String {
        let width = width.max(MIN_WIDTH);
        let height = height.max(MIN_HEIGHT);
        let Some(bounds) = BoundingBox::from_points(self.markers.iter().map(|m| &m.location)) else {
            return "(no buses to draw)\n".to_string();
        };
        let canvas = Canvas::new(bounds.padded(0.15, 0.1), width, height);
        let mut grid = vec![vec![' '; width]; height];

        for overlay in &self.overlays {
            let a = canvas.project(&overlay.from_location);
            let b = canvas.project(&overlay.to_location);
            let glyph = line_glyph(a, b);
            for (x, y) in bresenham(a, b) {
                grid[y][x] = glyph;
            }
        }

        for marker in &self.markers {
            let (x, y) = canvas.project(&marker.location);
            grid[y][x] = '●';
            let label: Vec<char> = marker.name.chars().collect();
            // Labels that would run off the east edge go west of the marker.
            let start = if x + 2 + label.len() <= width {
                x + 2
            } else {
                x.saturating_sub(label.len() + 1)
            };
            for (offset, ch) in label.into_iter().enumerate() {
                let col = start + offset;
                if col >= width || (col >= x && start < x) {
                    break;
                }
                grid[y][col] = ch;
            }
        }

        let mut out = String::new();
        for row in grid {
            let line: String = row.into_iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        for overlay in &self.overlays {
            out.push_str(&format!("  {:<20} {}\n", overlay.line, overlay.describe()));
        }
        out
    }

    /// GeoJSON FeatureCollection: a Point per marker, a LineString per overlay.
    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.location.lon.value(), m.location.lat.value()],
                    },
                    "properties": {
                        "name": m.name,
                        "technology": m.technology,
                    },
                })
            })
            .collect();

        features.extend(self.overlays.iter().map(|o| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [
                        [o.from_location.lon.value(), o.from_location.lat.value()],
                        [o.to_location.lon.value(), o.to_location.lat.value()],
                    ],
                },
                "properties": {
                    "name": o.line,
                    "from": o.from,
                    "to": o.to,
                    "flow_mw": o.flow_mw,
                    "loading_percent": o.loading_percent,
                },
            })
        }));

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

struct Canvas {
    bounds: BoundingBox,
    width: usize,
    height: usize,
}

impl Canvas {
    fn new(bounds: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    /// Map a point to (column, row); north is up. Clamped to the grid.
    fn project(&self, p: &GeoPoint) -> (usize, usize) {
        let fx = (p.lon.value() - self.bounds.min_lon) / self.bounds.lon_span();
        let fy = (self.bounds.max_lat - p.lat.value()) / self.bounds.lat_span();
        let col = (fx * (self.width - 1) as f64).round().clamp(0.0, (self.width - 1) as f64);
        let row = (fy * (self.height - 1) as f64).round().clamp(0.0, (self.height - 1) as f64);
        (col as usize, row as usize)
    }
}

fn line_glyph(a: (usize, usize), b: (usize, usize)) -> char {
    let dx = b.0 as i64 - a.0 as i64;
    let dy = b.1 as i64 - a.1 as i64;
    if dy.abs() * 2 <= dx.abs() {
        '-'
    } else if dx.abs() * 2 <= dy.abs() {
        '|'
    } else if (dx > 0) == (dy > 0) {
        '\\'
    } else {
        '/'
    }
}

/// Integer Bresenham, both endpoints included.
fn bresenham(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
    let (mut x0, mut y0) = (a.0 as i64, a.1 as i64);
    let (x1, y1) = (b.0 as i64, b.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut points = Vec::with_capacity((dx - dy) as usize + 1);
    loop {
        points.push((x0 as usize, y0 as usize));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use kattegat_scenarios::LOCATIONS;

    #[test]
    fn bresenham_covers_both_ends() {
        let points = bresenham((0, 0), (4, 2));
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(4, 2)));
        assert_eq!(points.len(), 5);

        assert_eq!(bresenham((3, 3), (3, 3)), vec![(3, 3)]);
        assert_eq!(bresenham((2, 5), (2, 1)).len(), 5);
    }

    #[test]
    fn glyph_follows_slope() {
        assert_eq!(line_glyph((0, 0), (10, 1)), '-');
        assert_eq!(line_glyph((0, 0), (1, 10)), '|');
        assert_eq!(line_glyph((0, 0), (5, 5)), '\\');
        assert_eq!(line_glyph((0, 5), (5, 0)), '/');
    }

    #[test]
    fn idle_map_has_markers_only() {
        let view = MapView::from_topology(&Topology::danish_triangle());
        assert_eq!(view.markers().len(), 3);
        assert!(view.overlays().is_empty());

        let text = view.render_ascii(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        assert_eq!(text.matches('●').count(), 3);
        assert!(text.contains("Copenhagen"));
        assert!(!text.contains(" MW"));
    }

    #[test]
    fn eastern_label_stays_on_canvas() {
        let view = MapView::from_topology(&Topology::danish_triangle());
        for (width, height) in [(20, 8), (40, 12), (60, 20), (80, 24)] {
            let text = view.render_ascii(width, height);
            for name in LOCATIONS {
                assert!(text.contains(name), "{name} missing at {width}x{height}:\n{text}");
            }
            assert!(text.lines().all(|line| line.chars().count() <= width));
        }
    }

    #[test]
    fn aalborg_is_north_of_copenhagen() {
        let view = MapView::from_topology(&Topology::danish_triangle());
        let bounds = BoundingBox::from_points(view.markers().iter().map(|m| &m.location))
            .unwrap()
            .padded(0.15, 0.1);
        let canvas = Canvas::new(bounds, 40, 12);
        let (cph_x, cph_y) = canvas.project(&view.markers()[0].location);
        let (aal_x, aal_y) = canvas.project(&view.markers()[2].location);
        assert!(aal_y < cph_y);
        assert!(aal_x < cph_x);
    }

    #[test]
    fn overlay_description_follows_flow_direction() {
        let overlay = LineOverlay {
            line: "Aalborg_Copenhagen".into(),
            from: "Aalborg".into(),
            to: "Copenhagen".into(),
            from_location: GeoPoint::new(57.0488, 9.9217),
            to_location: GeoPoint::new(55.6761, 12.5683),
            flow_mw: -27.78,
            loading_percent: Some(27.78),
        };
        assert_eq!(overlay.describe(), "Copenhagen -> Aalborg 27.8 MW (28%)");
    }
}
