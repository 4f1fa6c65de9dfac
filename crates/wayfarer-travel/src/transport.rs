use std::fmt;

use serde::{Deserialize, Serialize};
use wayfarer_core::Position;
use wayfarer_paths::chebyshev;

use crate::requirement::RequirementSet;
use crate::script::Script;
use crate::world::WorldState;

/// Index of an edge inside its [`TransportGraph`](crate::TransportGraph).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad kind of transport, used for filtering and logs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Door,
    Stairs,
    Shortcut,
    Npc,
    Teleport,
    FairyRing,
    SpiritTree,
    Glider,
    Canoe,
    Minecart,
    Ship,
    #[default]
    Other,
}

/// A directed non-walking connection between two places.
///
/// An edge without an origin can be used from anywhere (teleports). The
/// agent may board within `origin_radius` of the origin and is considered
/// delivered within `destination_radius` of the destination.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportEdge {
    pub id: EdgeId,
    pub name: String,
    pub category: Category,
    pub origin: Option<Position>,
    pub destination: Position,
    pub origin_radius: u32,
    pub destination_radius: u32,
    /// Estimated ticks to complete the script.
    pub cost: u32,
    /// Cost of the opposite direction, for two-way transports.
    pub reverse_cost: Option<u32>,
    pub requirements: RequirementSet,
    pub script: Script,
}

impl TransportEdge {
    /// An edge from `origin` to `destination`. Its id is assigned when it is
    /// added to a graph.
    pub fn new(name: impl Into<String>, origin: Position, destination: Position, cost: u32) -> Self {
        Self {
            id: EdgeId(0),
            name: name.into(),
            category: Category::Other,
            origin: Some(origin),
            destination,
            origin_radius: 0,
            destination_radius: 0,
            cost,
            reverse_cost: None,
            requirements: RequirementSet::new(),
            script: Script::new(),
        }
    }

    /// An edge usable from anywhere.
    pub fn teleport(name: impl Into<String>, destination: Position, cost: u32) -> Self {
        Self {
            origin: None,
            category: Category::Teleport,
            ..Self::new(name, destination, destination, cost)
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_requirements(mut self, requirements: RequirementSet) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    pub fn with_origin_radius(mut self, radius: u32) -> Self {
        self.origin_radius = radius;
        self
    }

    pub fn with_destination_radius(mut self, radius: u32) -> Self {
        self.destination_radius = radius;
        self
    }

    #[inline]
    pub fn is_teleport(&self) -> bool {
        self.origin.is_none()
    }

    /// Whether the requirements hold right now.
    pub fn is_usable<W: WorldState + ?Sized>(&self, world: &W) -> bool {
        self.requirements.is_satisfied(world)
    }

    /// Whether the agent standing on `p` can start the script.
    pub fn can_board_from(&self, p: Position) -> bool {
        match self.origin {
            None => true,
            Some(o) => o.plane == p.plane && chebyshev(o, p) <= self.origin_radius as i32,
        }
    }

    /// Whether `p` counts as having arrived at the destination.
    pub fn delivered(&self, p: Position) -> bool {
        p.plane == self.destination.plane
            && chebyshev(p, self.destination) <= self.destination_radius as i32
    }
}

impl fmt::Display for TransportEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boarding_radius() {
        let e = TransportEdge::new("Ladder", Position::new(5, 5, 0), Position::new(5, 5, 1), 2)
            .with_origin_radius(1);
        assert!(e.can_board_from(Position::new(5, 5, 0)));
        assert!(e.can_board_from(Position::new(6, 4, 0)));
        assert!(!e.can_board_from(Position::new(7, 5, 0)));
        assert!(!e.can_board_from(Position::new(5, 5, 1)));
        assert!(!e.is_teleport());
    }

    #[test]
    fn teleports_board_anywhere() {
        let e = TransportEdge::teleport("Home teleport", Position::new(3222, 3218, 0), 20);
        assert!(e.is_teleport());
        assert_eq!(e.category, Category::Teleport);
        assert!(e.can_board_from(Position::new(0, 0, 3)));
    }

    #[test]
    fn delivery_radius() {
        let e = TransportEdge::teleport("Glory", Position::new(10, 10, 0), 4).with_destination_radius(2);
        assert!(e.delivered(Position::new(12, 8, 0)));
        assert!(!e.delivered(Position::new(13, 10, 0)));
        assert!(!e.delivered(Position::new(10, 10, 1)));
    }
}
