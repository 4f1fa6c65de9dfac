//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;

use wayfarer_core::{GridSnapshot, Position};

use crate::script::Interaction;
use crate::world::{Actuator, ItemSource, QuestState, VarKind, WorldState};

/// World state backed by plain maps. Tests move the agent by assigning
/// `pos` directly.
#[derive(Debug, Clone)]
pub(crate) struct FakeWorld {
    pub pos: Position,
    pub idle: bool,
    pub members: bool,
    pub items: HashMap<u32, u32>,
    pub quests: HashMap<String, QuestState>,
    pub vars: HashMap<(VarKind, u32), i32>,
    pub skills: HashMap<String, u32>,
    pub snapshot: Option<GridSnapshot>,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            pos: Position::new(0, 0, 0),
            idle: true,
            members: false,
            items: HashMap::new(),
            quests: HashMap::new(),
            vars: HashMap::new(),
            skills: HashMap::new(),
            snapshot: None,
        }
    }
}

impl FakeWorld {
    pub fn at(pos: Position, snapshot: GridSnapshot) -> Self {
        Self {
            pos,
            snapshot: Some(snapshot),
            ..Self::default()
        }
    }
}

impl WorldState for FakeWorld {
    fn position(&self) -> Position {
        self.pos
    }

    fn is_idle(&self) -> bool {
        self.idle
    }

    fn item_count(&self, item: u32, _source: ItemSource) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    fn quest_state(&self, quest: &str) -> QuestState {
        self.quests
            .get(quest)
            .copied()
            .unwrap_or(QuestState::NotStarted)
    }

    fn var(&self, kind: VarKind, id: u32) -> i32 {
        self.vars.get(&(kind, id)).copied().unwrap_or(0)
    }

    fn skill_level(&self, skill: &str) -> u32 {
        self.skills.get(skill).copied().unwrap_or(1)
    }

    fn is_members_world(&self) -> bool {
        self.members
    }

    fn snapshot(&self, _around: Position) -> Option<GridSnapshot> {
        self.snapshot.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Walk(Position),
    Interact(Interaction),
}

/// Actuator that records every command it receives.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub commands: Vec<Command>,
}

impl Recorder {
    pub fn last(&self) -> Option<&Command> {
        self.commands.last()
    }

    pub fn walks(&self) -> impl Iterator<Item = Position> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::Walk(p) => Some(*p),
            Command::Interact(_) => None,
        })
    }
}

impl Actuator for Recorder {
    fn walk_to(&mut self, target: Position) {
        self.commands.push(Command::Walk(target));
    }

    fn interact(&mut self, interaction: &Interaction) {
        self.commands.push(Command::Interact(interaction.clone()));
    }
}
