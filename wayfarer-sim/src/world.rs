//! A tiny tile world the navigator can be driven against.
//!
//! The agent walks one tile per tick along a local path, and transports
//! carry it to their destination a couple of ticks after the final
//! interaction of their script.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use log::{debug, info, trace};
use serde::Deserialize;
use wayfarer_core::{CollisionFlags, Direction, GridSnapshot, Position};
use wayfarer_paths::SearchRange;
use wayfarer_travel::{
    Actuator, Interaction, ItemSource, QuestState, TransportGraph, VarKind, WorldState,
};

/// Ticks between the last interaction of a transport and landing.
pub const TRANSIT_TICKS: u32 = 2;

/// Account state the simulated agent answers requirement queries from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub members: bool,
    pub items: HashMap<u32, u32>,
    pub equipped: HashMap<u32, u32>,
    pub quests: HashMap<String, QuestState>,
    pub varbits: HashMap<u32, i32>,
    pub varps: HashMap<u32, i32>,
    pub skills: HashMap<String, u32>,
}

impl Profile {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid profile")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        Self::from_json(&s)
    }
}

/// Commands issued during one tick, applied to the world afterwards.
#[derive(Debug, Default)]
pub struct Outbox {
    walk: Option<Position>,
    interactions: Vec<Interaction>,
}

impl Outbox {
    pub fn is_empty(&self) -> bool {
        self.walk.is_none() && self.interactions.is_empty()
    }
}

impl Actuator for Outbox {
    fn walk_to(&mut self, target: Position) {
        self.walk = Some(target);
    }

    fn interact(&mut self, interaction: &Interaction) {
        self.interactions.push(interaction.clone());
    }
}

#[derive(Debug, Clone, Copy)]
struct Transit {
    destination: Position,
    ticks: u32,
}

#[derive(Debug)]
pub struct SimWorld {
    map: GridSnapshot,
    graph: Arc<TransportGraph>,
    profile: Profile,
    pos: Position,
    path: VecDeque<Position>,
    transit: Option<Transit>,
    search: SearchRange,
}

impl SimWorld {
    pub fn new(map: GridSnapshot, graph: Arc<TransportGraph>, profile: Profile, pos: Position) -> Self {
        let search = SearchRange::new(map.area(), pos.plane);
        Self {
            map,
            graph,
            profile,
            pos,
            path: VecDeque::new(),
            transit: None,
            search,
        }
    }

    pub fn map(&self) -> &GridSnapshot {
        &self.map
    }

    /// Drop an obstacle on `p`. Returns whether `p` is on the map.
    pub fn block(&mut self, p: Position) -> bool {
        self.map.insert_flags(p, CollisionFlags::OBJECT)
    }

    /// Carry out the commands of the last tick.
    pub fn apply(&mut self, outbox: Outbox) {
        for interaction in &outbox.interactions {
            self.interact(interaction);
        }
        if let Some(target) = outbox.walk {
            self.walk_to(target);
        }
    }

    fn walk_to(&mut self, target: Position) {
        if self.transit.is_some() {
            trace!("ignoring walk to {target} while in transit");
            return;
        }
        match self.search.local_path(&self.map, self.pos, target) {
            Some(path) => {
                trace!("walking {} tiles to {target}", path.len());
                self.path = path.into();
            }
            None => {
                debug!("no walkable route from {} to {target}", self.pos);
                self.path.clear();
            }
        }
    }

    fn interact(&mut self, interaction: &Interaction) {
        let pos = self.pos;
        let edge = self.graph.usable(&*self).find(|e| {
            e.script.last_interaction() == Some(interaction) && e.can_board_from(pos)
        });
        let Some(edge) = edge else {
            trace!("{:?} \"{}\" at {pos}: nothing happens", interaction.target, interaction.action);
            return;
        };
        info!("taking {edge} from {pos}");
        let destination = edge.destination;
        self.path.clear();
        self.transit = Some(Transit {
            destination,
            ticks: TRANSIT_TICKS,
        });
    }

    /// Advance the world by one tick.
    pub fn step(&mut self) {
        if let Some(mut transit) = self.transit.take() {
            transit.ticks = transit.ticks.saturating_sub(1);
            if transit.ticks == 0 {
                debug!("landed at {}", transit.destination);
                self.pos = transit.destination;
            } else {
                self.transit = Some(transit);
            }
            return;
        }
        let Some(next) = self.path.pop_front() else {
            return;
        };
        let dir = (next.plane == self.pos.plane)
            .then(|| Direction::from_delta(next.x - self.pos.x, next.y - self.pos.y))
            .flatten();
        match dir {
            Some(dir) if self.map.can_move(self.pos, dir) => self.pos = next,
            _ => {
                debug!("blocked moving {} -> {next}", self.pos);
                self.path.clear();
            }
        }
    }
}

impl WorldState for SimWorld {
    fn position(&self) -> Position {
        self.pos
    }

    fn is_idle(&self) -> bool {
        self.path.is_empty() && self.transit.is_none()
    }

    fn item_count(&self, item: u32, source: ItemSource) -> u32 {
        let held = |m: &HashMap<u32, u32>| m.get(&item).copied().unwrap_or(0);
        match source {
            ItemSource::Inventory => held(&self.profile.items),
            ItemSource::Equipped => held(&self.profile.equipped),
            ItemSource::Either => held(&self.profile.items) + held(&self.profile.equipped),
        }
    }

    fn quest_state(&self, quest: &str) -> QuestState {
        self.profile
            .quests
            .get(quest)
            .copied()
            .unwrap_or(QuestState::NotStarted)
    }

    fn var(&self, kind: VarKind, id: u32) -> i32 {
        let vars = match kind {
            VarKind::Varbit => &self.profile.varbits,
            VarKind::Varp => &self.profile.varps,
        };
        vars.get(&id).copied().unwrap_or(0)
    }

    fn skill_level(&self, skill: &str) -> u32 {
        self.profile.skills.get(skill).copied().unwrap_or(1)
    }

    fn is_members_world(&self) -> bool {
        self.profile.members
    }

    fn snapshot(&self, around: Position) -> Option<GridSnapshot> {
        self.map.contains(around).then(|| self.map.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::Chart;
    use wayfarer_travel::{Script, Target, TransportEdge};

    fn p(x: i32, y: i32, plane: u8) -> Position {
        Position::new(x, y, plane)
    }

    fn pull_lever() -> Interaction {
        Interaction::new(Target::Object { id: 7 }, "Pull")
    }

    fn world(pos: Position) -> SimWorld {
        let map = Chart::new(".....\n.....\n.....").unwrap().snapshot(p(0, 0, 0)).unwrap();
        let edge = TransportEdge::new("Lever", p(0, 0, 0), p(4, 2, 0), 1)
            .with_script(Script::new().interact(Target::Object { id: 7 }, "Pull"));
        let graph = TransportGraph::builder().edge(edge).build();
        SimWorld::new(map, Arc::new(graph), Profile::default(), pos)
    }

    #[test]
    fn walks_one_tile_per_tick() {
        let mut w = world(p(0, 0, 0));
        let mut out = Outbox::default();
        out.walk_to(p(3, 0, 0));
        w.apply(out);
        assert!(!w.is_idle());
        w.step();
        assert_eq!(w.position(), p(1, 0, 0));
        w.step();
        w.step();
        assert_eq!(w.position(), p(3, 0, 0));
        assert!(w.is_idle());
    }

    #[test]
    fn obstacle_stops_the_walk() {
        let mut w = world(p(0, 1, 0));
        let mut out = Outbox::default();
        out.walk_to(p(4, 1, 0));
        w.apply(out);
        w.step();
        assert_eq!(w.position(), p(1, 1, 0));
        for x in 0..5 {
            for y in 0..3 {
                if x >= 2 {
                    w.block(p(x, y, 0));
                }
            }
        }
        w.step();
        assert_eq!(w.position(), p(1, 1, 0));
        assert!(w.is_idle());
    }

    #[test]
    fn interaction_carries_after_transit() {
        let mut w = world(p(0, 0, 0));
        let mut out = Outbox::default();
        out.interact(&pull_lever());
        w.apply(out);
        assert!(!w.is_idle());
        for _ in 1..TRANSIT_TICKS {
            w.step();
            assert_eq!(w.position(), p(0, 0, 0));
        }
        w.step();
        assert_eq!(w.position(), p(4, 2, 0));
        assert!(w.is_idle());
    }

    #[test]
    fn interaction_away_from_origin_does_nothing() {
        let mut w = world(p(2, 2, 0));
        let mut out = Outbox::default();
        out.interact(&pull_lever());
        w.apply(out);
        assert!(w.is_idle());
        w.step();
        assert_eq!(w.position(), p(2, 2, 0));
    }

    #[test]
    fn profile_answers_requirements() {
        let profile = Profile::from_json(
            r#"{"items": {"995": 10}, "equipped": {"995": 2}, "skills": {"agility": 40},
                "quests": {"Dragon Slayer": "in_progress"}, "varbits": {"4": -1}}"#,
        )
        .unwrap();
        let mut w = world(p(0, 0, 0));
        w.profile = profile;
        assert_eq!(w.item_count(995, ItemSource::Either), 12);
        assert_eq!(w.item_count(995, ItemSource::Equipped), 2);
        assert_eq!(w.skill_level("agility"), 40);
        assert_eq!(w.skill_level("magic"), 1);
        assert_eq!(w.quest_state("Dragon Slayer"), QuestState::InProgress);
        assert_eq!(w.quest_state("Cook's Assistant"), QuestState::NotStarted);
        assert_eq!(w.var(VarKind::Varbit, 4), -1);
        assert_eq!(w.var(VarKind::Varp, 4), 0);
        assert!(!w.is_members_world());
    }
}
