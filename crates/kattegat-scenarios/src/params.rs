//! The nine scalar inputs of the Danish triangle model.
//!
//! Index `i` of every array refers to the same site: 0 is wind at
//! Copenhagen, 1 solar at Aarhus, 2 gas at Aalborg.

use std::fmt;
use std::str::FromStr;

use kattegat_algo::OpfError;
use serde::{Deserialize, Serialize};

/// Site names in parameter order
pub const LOCATIONS: [&str; 3] = ["Copenhagen", "Aarhus", "Aalborg"];

/// Technology built at each site, in parameter order
pub const TECHNOLOGIES: [&str; 3] = ["wind", "solar", "gas"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Fixed demand per site (MW)
    pub demand: [f64; 3],
    /// Installed capacity per generator (MW)
    pub capacity: [f64; 3],
    /// Marginal cost per generator (per MWh)
    pub cost: [f64; 3],
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            demand: [50.0, 50.0, 50.0],
            capacity: [100.0, 80.0, 120.0],
            cost: [20.0, 25.0, 50.0],
        }
    }
}

impl ModelParams {
    pub fn get(&self, field: ParamField) -> f64 {
        match field.kind {
            ParamKind::Demand => self.demand[field.site],
            ParamKind::Capacity => self.capacity[field.site],
            ParamKind::Cost => self.cost[field.site],
        }
    }

    /// Set one field. Negative or non-finite values are rejected and the
    /// field keeps its previous value.
    pub fn set(&mut self, field: ParamField, value: f64) -> Result<(), OpfError> {
        check_value(field, value)?;
        let slot = match field.kind {
            ParamKind::Demand => &mut self.demand[field.site],
            ParamKind::Capacity => &mut self.capacity[field.site],
            ParamKind::Cost => &mut self.cost[field.site],
        };
        *slot = value;
        Ok(())
    }

    /// Reject the first negative or non-finite field, in canonical order.
    pub fn validate(&self) -> Result<(), OpfError> {
        ParamField::ALL
            .iter()
            .try_for_each(|&field| check_value(field, self.get(field)))
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.capacity.iter().sum()
    }

    /// Copy with every demand multiplied by `scale`.
    pub fn with_load_scale(mut self, scale: f64) -> Self {
        for d in &mut self.demand {
            *d *= scale;
        }
        self
    }
}

fn check_value(field: ParamField, value: f64) -> Result<(), OpfError> {
    if !value.is_finite() {
        return Err(OpfError::InvalidInput(format!(
            "{} must be a finite number, got {}",
            field.key(),
            value
        )));
    }
    if value < 0.0 {
        return Err(OpfError::InvalidInput(format!(
            "{} must be non-negative, got {}",
            field.key(),
            value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Demand,
    Capacity,
    Cost,
}

/// One of the nine model inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamField {
    pub kind: ParamKind,
    /// Site index, 0..3
    pub site: usize,
}

impl ParamField {
    /// Canonical order: demands, then capacities, then costs.
    pub const ALL: [ParamField; 9] = [
        ParamField::new(ParamKind::Demand, 0),
        ParamField::new(ParamKind::Demand, 1),
        ParamField::new(ParamKind::Demand, 2),
        ParamField::new(ParamKind::Capacity, 0),
        ParamField::new(ParamKind::Capacity, 1),
        ParamField::new(ParamKind::Capacity, 2),
        ParamField::new(ParamKind::Cost, 0),
        ParamField::new(ParamKind::Cost, 1),
        ParamField::new(ParamKind::Cost, 2),
    ];

    pub const fn new(kind: ParamKind, site: usize) -> Self {
        Self { kind, site }
    }

    /// Stable key: `demand.copenhagen`, `capacity.wind`, `cost.gas`, ...
    pub fn key(&self) -> String {
        match self.kind {
            ParamKind::Demand => format!("demand.{}", LOCATIONS[self.site].to_lowercase()),
            ParamKind::Capacity => format!("capacity.{}", TECHNOLOGIES[self.site]),
            ParamKind::Cost => format!("cost.{}", TECHNOLOGIES[self.site]),
        }
    }

    /// Human label for forms and tables
    pub fn label(&self) -> String {
        let location = LOCATIONS[self.site];
        let tech = capitalize(TECHNOLOGIES[self.site]);
        match self.kind {
            ParamKind::Demand => format!("Demand {} ({})", location, self.unit()),
            ParamKind::Capacity => format!("{} capacity @ {} ({})", tech, location, self.unit()),
            ParamKind::Cost => format!("{} cost @ {} ({})", tech, location, self.unit()),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self.kind {
            ParamKind::Demand | ParamKind::Capacity => "MW",
            ParamKind::Cost => "per MWh",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for ParamField {
    type Err = String;

    /// Accepts `<kind>.<location>` for every kind and `<kind>.<technology>`
    /// for capacity and cost; `_` works in place of `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', ".");
        let (kind, target) = normalized
            .split_once('.')
            .ok_or_else(|| unknown_field(s))?;
        let kind = match kind {
            "demand" | "load" => ParamKind::Demand,
            "capacity" | "cap" => ParamKind::Capacity,
            "cost" => ParamKind::Cost,
            _ => return Err(unknown_field(s)),
        };
        let by_location = LOCATIONS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(target));
        let by_technology = TECHNOLOGIES.iter().position(|t| *t == target);
        let site = match kind {
            ParamKind::Demand => by_location,
            ParamKind::Capacity | ParamKind::Cost => by_location.or(by_technology),
        }
        .ok_or_else(|| unknown_field(s))?;
        Ok(ParamField::new(kind, site))
    }
}

fn unknown_field(s: &str) -> String {
    let keys: Vec<String> = ParamField::ALL.iter().map(|f| f.key()).collect();
    format!("unknown field '{}'; expected one of: {}", s, keys.join(", "))
}

/// "wind" -> "Wind"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
