//! Networks of interchangeable stations: fairy rings, spirit trees, gliders,
//! canoes and the like. Every station can reach some set of the others with
//! the same script, parameterized by the destination's name.

use serde::{Deserialize, Serialize};
use wayfarer_core::Position;

use crate::requirement::RequirementSet;
use crate::script::Script;
use crate::transport::{Category, TransportEdge};

/// Placeholder replaced by the destination station's name in network
/// scripts.
pub const STATION_PLACEHOLDER: &str = "station";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    /// Where the agent stands to use the station.
    pub position: Position,
    /// Where the agent lands when travelling to this station. Defaults to
    /// `position`.
    #[serde(default)]
    pub arrival: Option<Position>,
    /// Extra requirements for travelling from or to this station.
    #[serde(default)]
    pub requirements: RequirementSet,
}

impl Station {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            arrival: None,
            requirements: RequirementSet::new(),
        }
    }

    pub fn landing(&self) -> Position {
        self.arrival.unwrap_or(self.position)
    }
}

/// Which stations each station connects to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reach {
    /// Every other station.
    #[default]
    All,
    /// Stations at most this many places away in list order, like a river
    /// canoe that can only travel a few stops.
    Ordinal(u32),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationNetwork {
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub cost: u32,
    #[serde(default)]
    pub origin_radius: u32,
    #[serde(default)]
    pub destination_radius: u32,
    /// Requirements shared by every edge in the network.
    #[serde(default)]
    pub requirements: RequirementSet,
    #[serde(default)]
    pub reach: Reach,
    /// Script template; `{station}` is replaced by the destination's name.
    #[serde(default)]
    pub script: Script,
    pub stations: Vec<Station>,
}

impl StationNetwork {
    /// Ordered `(from, to)` station index pairs connected by the network.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.stations.len();
        (0..n).flat_map(move |i| {
            (0..n).filter_map(move |j| {
                let connected = i != j
                    && match self.reach {
                        Reach::All => true,
                        Reach::Ordinal(k) => i.abs_diff(j) <= k as usize,
                    };
                connected.then_some((i, j))
            })
        })
    }

    /// Expand into one transport edge per link. Ids are assigned later by
    /// the graph builder.
    pub fn edges(&self) -> Vec<TransportEdge> {
        self.links()
            .map(|(i, j)| {
                let from = &self.stations[i];
                let to = &self.stations[j];
                let requirements = self
                    .requirements
                    .merged(&from.requirements)
                    .merged(&to.requirements);
                TransportEdge::new(
                    format!("{}: {} -> {}", self.name, from.name, to.name),
                    from.position,
                    to.landing(),
                    self.cost,
                )
                .with_category(self.category)
                .with_origin_radius(self.origin_radius)
                .with_destination_radius(self.destination_radius)
                .with_requirements(requirements)
                .with_script(self.script.substitute(STATION_PLACEHOLDER, &to.name))
            })
            .collect()
    }
}
