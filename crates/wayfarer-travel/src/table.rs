//! JSON transport tables.
//!
//! ```json
//! {
//!   "transports": [
//!     {
//!       "name": "Lumbridge castle staircase",
//!       "category": "stairs",
//!       "origin": {"x": 3205, "y": 3208, "plane": 0},
//!       "destination": {"x": 3205, "y": 3209, "plane": 1},
//!       "cost": 3,
//!       "script": [{"op": "interact", "target": {"kind": "object", "id": 16671}, "action": "Climb-up"}],
//!       "reverse": {"script": [{"op": "interact", "target": {"kind": "object", "id": 16672}, "action": "Climb-down"}]}
//!     }
//!   ],
//!   "networks": []
//! }
//! ```

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use wayfarer_core::Position;

use crate::error::LoadError;
use crate::graph::TransportGraph;
use crate::network::StationNetwork;
use crate::requirement::RequirementSet;
use crate::script::Script;
use crate::transport::{Category, TransportEdge};

fn one() -> u32 {
    1
}

/// One transport, optionally usable in both directions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDef {
    pub name: String,
    #[serde(default)]
    pub category: Category,
    /// Absent for transports usable from anywhere.
    #[serde(default)]
    pub origin: Option<Position>,
    pub destination: Position,
    #[serde(default = "one")]
    pub cost: u32,
    #[serde(default)]
    pub origin_radius: u32,
    #[serde(default)]
    pub destination_radius: u32,
    #[serde(default)]
    pub requirements: RequirementSet,
    #[serde(default)]
    pub script: Script,
    #[serde(default)]
    pub reverse: Option<ReverseDef>,
}

/// The way back along a two-way transport. Unset fields mirror the forward
/// direction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub requirements: Option<RequirementSet>,
    #[serde(default)]
    pub script: Option<Script>,
}

impl TransportDef {
    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.origin.into_iter().chain(std::iter::once(self.destination))
    }

    /// The edges described: the forward one, and the reverse if any.
    pub fn edges(&self) -> Vec<TransportEdge> {
        let forward = TransportEdge {
            origin: self.origin,
            ..TransportEdge::new(self.name.clone(), self.destination, self.destination, self.cost)
        }
        .with_category(self.category)
        .with_origin_radius(self.origin_radius)
        .with_destination_radius(self.destination_radius)
        .with_requirements(self.requirements.clone())
        .with_script(self.script.clone());

        let (Some(origin), Some(rev)) = (self.origin, &self.reverse) else {
            return vec![forward];
        };
        let back = TransportEdge::new(
            rev.name
                .clone()
                .unwrap_or_else(|| format!("{} (back)", self.name)),
            self.destination,
            origin,
            rev.cost.unwrap_or(self.cost),
        )
        .with_category(self.category)
        .with_origin_radius(self.destination_radius)
        .with_destination_radius(self.origin_radius)
        .with_requirements(rev.requirements.clone().unwrap_or_else(|| self.requirements.clone()))
        .with_script(rev.script.clone().unwrap_or_else(|| self.script.clone()));
        let forward = TransportEdge {
            reverse_cost: Some(back.cost),
            ..forward
        };
        let back = TransportEdge {
            reverse_cost: Some(forward.cost),
            ..back
        };
        vec![forward, back]
    }
}

/// The whole contents of a transport file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportTable {
    #[serde(default)]
    pub transports: Vec<TransportDef>,
    #[serde(default)]
    pub networks: Vec<StationNetwork>,
}

impl TransportTable {
    /// Parse and validate a table.
    pub fn from_json(s: &str) -> Result<Self, LoadError> {
        let table: TransportTable = serde_json::from_str(s)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&s)?;
        debug!(
            "loaded {} transports and {} networks from {}",
            table.transports.len(),
            table.networks.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        for t in &self.transports {
            if let Some(position) = t.positions().find(|p| !p.is_packable()) {
                return Err(LoadError::InvalidPosition {
                    name: t.name.clone(),
                    position,
                });
            }
            if t.origin.is_none() && t.reverse.is_some() {
                return Err(LoadError::ReverseWithoutOrigin(t.name.clone()));
            }
        }
        for n in &self.networks {
            if n.stations.len() < 2 {
                return Err(LoadError::EmptyNetwork(n.name.clone()));
            }
            for s in &n.stations {
                if let Some(position) = [s.position, s.landing()].into_iter().find(|p| !p.is_packable()) {
                    return Err(LoadError::InvalidPosition {
                        name: format!("{}: {}", n.name, s.name),
                        position,
                    });
                }
            }
        }
        Ok(())
    }

    /// Expand every definition into a graph. Plain transports come first,
    /// in file order, followed by network edges.
    pub fn build(&self) -> TransportGraph {
        let mut b = TransportGraph::builder();
        for t in &self.transports {
            b.extend(t.edges());
        }
        for n in &self.networks {
            b.extend(n.edges());
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::EdgeId;

    const TABLE: &str = r#"{
        "transports": [
            {
                "name": "Castle staircase",
                "category": "stairs",
                "origin": {"x": 10, "y": 10, "plane": 0},
                "destination": {"x": 10, "y": 11, "plane": 1},
                "cost": 3,
                "script": [{"op": "interact", "target": {"kind": "object", "id": 16671}, "action": "Climb-up"}],
                "reverse": {"script": [{"op": "interact", "target": {"kind": "object", "id": 16672}, "action": "Climb-down"}]}
            },
            {
                "name": "Home teleport",
                "destination": {"x": 0, "y": 0, "plane": 0},
                "cost": 20
            }
        ],
        "networks": [
            {
                "name": "Glider",
                "cost": 6,
                "stations": [
                    {"name": "Ta Quir Priw", "position": {"x": 40, "y": 40, "plane": 0}},
                    {"name": "Sindarpos", "position": {"x": 60, "y": 40, "plane": 0}}
                ]
            }
        ]
    }"#;

    #[test]
    fn builds_every_direction() {
        let table = TransportTable::from_json(TABLE).unwrap();
        let g = table.build();
        assert_eq!(g.len(), 5);

        let up = g.edge(EdgeId(0)).unwrap();
        let down = g.edge(EdgeId(1)).unwrap();
        assert_eq!(up.category, Category::Stairs);
        assert_eq!(down.name, "Castle staircase (back)");
        assert_eq!(down.origin, Some(Position::new(10, 11, 1)));
        assert_eq!(down.destination, Position::new(10, 10, 0));
        assert_eq!(down.cost, 3);
        assert_eq!(up.reverse_cost, Some(3));
        assert_eq!(down.reverse_cost, Some(3));
        assert_eq!(
            down.script.last_interaction().map(|i| i.action.as_str()),
            Some("Climb-down")
        );

        let home = g.edge(EdgeId(2)).unwrap();
        assert!(home.is_teleport());
        assert_eq!(home.cost, 20);
        assert_eq!(g.teleports().count(), 1);
        assert_eq!(g.edges_from(Position::new(40, 40, 0)).count(), 1);
    }

    #[test]
    fn cost_defaults_to_one() {
        let t: TransportDef = serde_json::from_str(
            r#"{"name": "Gap", "origin": {"x": 0, "y": 0, "plane": 0}, "destination": {"x": 2, "y": 0, "plane": 0}}"#,
        )
        .unwrap();
        assert_eq!(t.cost, 1);
        let edges = t.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].reverse_cost, None);
    }

    #[test]
    fn rejects_unpackable_positions() {
        let json = format!(
            r#"{{"transports": [{{"name": "Void", "destination": {{"x": {}, "y": 0, "plane": 0}}}}]}}"#,
            Position::COORD_MAX as i64 + 1
        );
        assert!(matches!(
            TransportTable::from_json(&json),
            Err(LoadError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn rejects_lonely_networks() {
        let json = r#"{"networks": [{"name": "Solo", "cost": 1, "stations": []}]}"#;
        assert!(matches!(
            TransportTable::from_json(json),
            Err(LoadError::EmptyNetwork(name)) if name == "Solo"
        ));
    }

    #[test]
    fn rejects_reverse_teleports() {
        let json = r#"{"transports": [{"name": "Tab", "destination": {"x": 1, "y": 1, "plane": 0}, "reverse": {}}]}"#;
        assert!(matches!(
            TransportTable::from_json(json),
            Err(LoadError::ReverseWithoutOrigin(_))
        ));
    }

    #[test]
    fn empty_table() {
        let table = TransportTable::from_json("{}").unwrap();
        assert!(table.build().is_empty());
    }
}
