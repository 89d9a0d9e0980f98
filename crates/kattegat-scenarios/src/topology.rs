//! Fixed network layouts the model builder can target.

use kattegat_core::GeoPoint;
use serde::{Deserialize, Serialize};

/// Reactance assigned per kilometre of line
pub const REACTANCE_PER_KM: f64 = 0.01;

/// Thermal rating of every line in the reference layout (MW)
pub const LINE_RATING_MW: f64 = 100.0;

/// A bus together with the one generator technology built there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub name: String,
    pub location: GeoPoint,
    pub technology: String,
}

impl Site {
    pub fn new(name: &str, lat: f64, lon: f64, technology: &str) -> Self {
        Self {
            name: name.to_string(),
            location: GeoPoint::new(lat, lon),
            technology: technology.to_string(),
        }
    }

    /// Generator identifier, `<technology>_<site>`
    pub fn generator_name(&self) -> String {
        format!("{}_{}", self.technology, self.name)
    }

    pub fn load_name(&self) -> String {
        format!("load_{}", self.name)
    }
}

/// A line between two sites, by index into [`Topology::sites`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Corridor {
    pub from: usize,
    pub to: usize,
    pub length_km: f64,
}

/// A controllable link between two sites. Unlike a [`Corridor`] its flow is
/// dispatched directly and takes no part in the angle equations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCorridor {
    pub name: String,
    pub from: usize,
    pub to: usize,
    pub p_nom: f64,
    /// Fraction of the sent power that arrives at `to`
    pub efficiency: f64,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    pub sites: Vec<Site>,
    pub corridors: Vec<Corridor>,
    pub links: Vec<LinkCorridor>,
    pub reactance_per_km: f64,
    /// Rating applied to every line; `None` leaves lines unconstrained
    pub line_rating_mw: Option<f64>,
}

impl Topology {
    /// Copenhagen (wind), Aarhus (solar) and Aalborg (gas), meshed by three
    /// lines of 150, 100 and 200 km.
    pub fn danish_triangle() -> Self {
        Self {
            sites: vec![
                Site::new("Copenhagen", 55.6761, 12.5683, "wind"),
                Site::new("Aarhus", 56.1629, 10.2039, "solar"),
                Site::new("Aalborg", 57.0488, 9.9217, "gas"),
            ],
            corridors: vec![
                Corridor {
                    from: 0,
                    to: 1,
                    length_km: 150.0,
                },
                Corridor {
                    from: 1,
                    to: 2,
                    length_km: 100.0,
                },
                Corridor {
                    from: 2,
                    to: 0,
                    length_km: 200.0,
                },
            ],
            links: Vec::new(),
            reactance_per_km: REACTANCE_PER_KM,
            line_rating_mw: Some(LINE_RATING_MW),
        }
    }

    /// Line identifier, `<from>_<to>`, or `None` for a dangling corridor.
    pub fn line_name(&self, corridor: &Corridor) -> Option<String> {
        let from = self.sites.get(corridor.from)?;
        let to = self.sites.get(corridor.to)?;
        Some(format!("{}_{}", from.name, to.name))
    }

    pub fn line_names(&self) -> Vec<String> {
        self.corridors
            .iter()
            .filter_map(|c| self.line_name(c))
            .collect()
    }

    pub fn with_link(mut self, link: LinkCorridor) -> Self {
        self.links.push(link);
        self
    }

    pub fn site_index(&self, name: &str) -> Option<usize> {
        self.sites
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_names() {
        let topology = Topology::danish_triangle();
        assert_eq!(
            topology.line_names(),
            vec!["Copenhagen_Aarhus", "Aarhus_Aalborg", "Aalborg_Copenhagen"]
        );
        assert_eq!(topology.sites[0].generator_name(), "wind_Copenhagen");
        assert_eq!(topology.sites[2].load_name(), "load_Aalborg");
        assert_eq!(topology.site_index("aarhus"), Some(1));
    }

    #[test]
    fn dangling_corridor_has_no_name() {
        let topology = Topology::danish_triangle();
        let corridor = Corridor {
            from: 0,
            to: 7,
            length_km: 1.0,
        };
        assert!(topology.line_name(&corridor).is_none());
    }

    #[test]
    fn reference_layout_has_no_links() {
        let topology = Topology::danish_triangle().with_link(LinkCorridor {
            name: "hvdc".into(),
            from: 0,
            to: 2,
            p_nom: 50.0,
            efficiency: 0.95,
            bidirectional: true,
        });
        assert!(Topology::danish_triangle().links.is_empty());
        assert_eq!(topology.links.len(), 1);
        assert_eq!(topology.line_names().len(), 3);
    }
}
