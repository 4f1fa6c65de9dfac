//! Predicates over world state that gate transport edges.
//!
//! Requirements are plain data so they can be loaded from transport tables.
//! They are re-evaluated every time an edge is considered; nothing here keeps
//! state between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::{ItemSource, QuestState, VarKind, WorldState};

/// How an item requirement combines several item ids.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMode {
    /// The counts of all ids added together must reach the amount.
    #[default]
    Any,
    /// Each id on its own must reach the amount.
    All,
}

/// Comparison used by variable requirements, read as `var <cmp> value`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    #[inline]
    pub fn apply(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
        }
    }
}

/// A single condition on world state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// Holding at least `amount` of the listed items.
    Item {
        ids: Vec<u32>,
        amount: u32,
        #[serde(default)]
        mode: ItemMode,
        #[serde(default)]
        source: ItemSource,
    },
    /// The quest is in one of `states`.
    Quest {
        quest: String,
        states: Vec<QuestState>,
    },
    /// An account variable compares true against `value`.
    Var {
        kind: VarKind,
        id: u32,
        cmp: Comparison,
        value: i32,
    },
    /// A skill is at least `level`.
    Skill { skill: String, level: u32 },
    /// The current world is (or is not) a members world.
    World { members: bool },
}

impl Requirement {
    /// At least `amount` of `item`, from inventory or equipment.
    pub fn item(item: u32, amount: u32) -> Self {
        Requirement::Item {
            ids: vec![item],
            amount,
            mode: ItemMode::Any,
            source: ItemSource::Either,
        }
    }

    pub fn quest(quest: impl Into<String>, states: &[QuestState]) -> Self {
        Requirement::Quest {
            quest: quest.into(),
            states: states.to_vec(),
        }
    }

    pub fn var(kind: VarKind, id: u32, cmp: Comparison, value: i32) -> Self {
        Requirement::Var {
            kind,
            id,
            cmp,
            value,
        }
    }

    pub fn skill(skill: impl Into<String>, level: u32) -> Self {
        Requirement::Skill {
            skill: skill.into(),
            level,
        }
    }

    pub fn members() -> Self {
        Requirement::World { members: true }
    }

    /// Evaluate against the current world state.
    pub fn is_satisfied<W: WorldState + ?Sized>(&self, world: &W) -> bool {
        match self {
            Requirement::Item {
                ids,
                amount,
                mode,
                source,
            } => match mode {
                ItemMode::Any => {
                    let total: u64 = ids
                        .iter()
                        .map(|&id| world.item_count(id, *source) as u64)
                        .sum();
                    total >= *amount as u64
                }
                ItemMode::All => ids
                    .iter()
                    .all(|&id| world.item_count(id, *source) >= *amount),
            },
            Requirement::Quest { quest, states } => states.contains(&world.quest_state(quest)),
            Requirement::Var {
                kind,
                id,
                cmp,
                value,
            } => cmp.apply(world.var(*kind, *id), *value),
            Requirement::Skill { skill, level } => world.skill_level(skill) >= *level,
            Requirement::World { members } => world.is_members_world() == *members,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Item {
                ids, amount, mode, ..
            } => {
                let joiner = match mode {
                    ItemMode::Any => "|",
                    ItemMode::All => "&",
                };
                let ids: Vec<String> = ids.iter().map(u32::to_string).collect();
                write!(f, "{amount}x item {}", ids.join(joiner))
            }
            Requirement::Quest { quest, states } => write!(f, "quest {quest} in {states:?}"),
            Requirement::Var {
                kind,
                id,
                cmp,
                value,
            } => write!(f, "{kind:?} {id} {} {value}", cmp.symbol()),
            Requirement::Skill { skill, level } => write!(f, "{skill} >= {level}"),
            Requirement::World { members: true } => f.write_str("members world"),
            Requirement::World { members: false } => f.write_str("free world"),
        }
    }
}

// ---------------------------------------------------------------------------
// RequirementSet
// ---------------------------------------------------------------------------

/// Logical AND of requirements. The empty set is always satisfied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSet(Vec<Requirement>);

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add one requirement.
    pub fn with(mut self, requirement: Requirement) -> Self {
        self.0.push(requirement);
        self
    }

    pub fn push(&mut self, requirement: Requirement) {
        self.0.push(requirement);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.0.iter()
    }

    /// Requirements of both sets, without duplicates.
    pub fn merged(&self, other: &RequirementSet) -> RequirementSet {
        let mut out = self.clone();
        for r in &other.0 {
            if !out.0.contains(r) {
                out.0.push(r.clone());
            }
        }
        out
    }

    /// Whether every requirement holds.
    pub fn is_satisfied<W: WorldState + ?Sized>(&self, world: &W) -> bool {
        self.0.iter().all(|r| r.is_satisfied(world))
    }

    /// The first requirement that does not hold, for diagnostics.
    pub fn first_unmet<W: WorldState + ?Sized>(&self, world: &W) -> Option<&Requirement> {
        self.0.iter().find(|r| !r.is_satisfied(world))
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
