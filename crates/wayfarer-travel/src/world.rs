//! Seams to the outside world: what the engine reads and what it commands.

use serde::{Deserialize, Serialize};
use wayfarer_core::{GridSnapshot, Position};

use crate::script::Interaction;

/// Progress through a quest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestState {
    NotStarted,
    InProgress,
    Finished,
}

/// Which family of account variables an id refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Varbit,
    Varp,
}

/// Where item counts are taken from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Inventory,
    Equipped,
    /// Inventory and equipment combined.
    #[default]
    Either,
}

/// Read-only view of the world the agent lives in.
///
/// Implementations are queried at search time and whenever a requirement is
/// evaluated; the engine never caches the answers.
pub trait WorldState {
    /// Where the agent currently stands.
    fn position(&self) -> Position;

    /// Whether the agent is neither moving nor animating.
    fn is_idle(&self) -> bool;

    fn item_count(&self, item: u32, source: ItemSource) -> u32;

    fn quest_state(&self, quest: &str) -> QuestState;

    fn var(&self, kind: VarKind, id: u32) -> i32;

    fn skill_level(&self, skill: &str) -> u32;

    fn is_members_world(&self) -> bool;

    /// Capture obstruction flags for a region containing `around`, or `None`
    /// if nothing is loaded there.
    fn snapshot(&self, around: Position) -> Option<GridSnapshot>;
}

/// Fire-and-forget commands to the agent. Completion is observed through
/// [`WorldState`], never returned.
pub trait Actuator {
    /// Start walking toward `target`.
    fn walk_to(&mut self, target: Position);

    /// Perform one scripted interaction.
    fn interact(&mut self, interaction: &Interaction);
}
