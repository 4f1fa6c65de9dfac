//! Interaction scripts attached to transport edges.
//!
//! A [`Script`] is an ordered list of [`ScriptStep`]s. A [`ScriptRunner`]
//! walks one script a tick at a time and issues at most one actuator command
//! per tick. Waiting steps are bounded by a timeout so a script can never
//! hang the executor.

use serde::{Deserialize, Serialize};
use wayfarer_core::Position;
use wayfarer_paths::chebyshev;

use crate::requirement::Requirement;
use crate::world::{Actuator, WorldState};

/// What an interaction is aimed at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// A scenery object such as a door or staircase.
    Object { id: u32 },
    Npc { id: u32 },
    /// An item held by the agent.
    Item { id: u32 },
    /// An interface component.
    Widget { id: u32 },
    /// The open dialogue, where the action names the option to pick.
    Dialogue,
}

/// One interaction: an action applied to a target, e.g. "Climb-up" on a
/// staircase object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    pub target: Target,
    pub action: String,
}

impl Interaction {
    pub fn new(target: Target, action: impl Into<String>) -> Self {
        Self {
            target,
            action: action.into(),
        }
    }
}

/// A condition on world state that a script can wait for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Condition {
    /// The agent is idle.
    Idle,
    /// The agent stands on `position`.
    At { position: Position },
    /// The agent is within a Chebyshev `radius` of `position`, on its plane.
    Within { position: Position, radius: u32 },
    /// The agent is on `plane`.
    Plane { plane: u8 },
    /// A requirement holds.
    Met { requirement: Requirement },
}

impl Condition {
    pub fn holds<W: WorldState + ?Sized>(&self, world: &W) -> bool {
        match self {
            Condition::Idle => world.is_idle(),
            Condition::At { position } => world.position() == *position,
            Condition::Within { position, radius } => {
                let p = world.position();
                p.plane == position.plane && chebyshev(p, *position) <= *radius as i32
            }
            Condition::Plane { plane } => world.position().plane == *plane,
            Condition::Met { requirement } => requirement.is_satisfied(world),
        }
    }
}

/// One step of a script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Interact(Interaction),
    /// Do nothing for `ticks` ticks.
    Delay { ticks: u32 },
    /// Wait until `condition` holds, for at most `timeout` ticks.
    WaitUntil { condition: Condition, timeout: u32 },
    /// Walk to `position` and wait to arrive, for at most `timeout` ticks.
    WalkTo { position: Position, timeout: u32 },
}

/// An ordered list of script steps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(Vec<ScriptStep>);

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interact(mut self, target: Target, action: impl Into<String>) -> Self {
        self.0.push(ScriptStep::Interact(Interaction::new(target, action)));
        self
    }

    pub fn delay(mut self, ticks: u32) -> Self {
        self.0.push(ScriptStep::Delay { ticks });
        self
    }

    pub fn wait_until(mut self, condition: Condition, timeout: u32) -> Self {
        self.0.push(ScriptStep::WaitUntil { condition, timeout });
        self
    }

    pub fn walk_to(mut self, position: Position, timeout: u32) -> Self {
        self.0.push(ScriptStep::WalkTo { position, timeout });
        self
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.0.push(step);
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last interaction in the script, if any.
    pub fn last_interaction(&self) -> Option<&Interaction> {
        self.0.iter().rev().find_map(|s| match s {
            ScriptStep::Interact(i) => Some(i),
            _ => None,
        })
    }

    /// Copy of the script with every `{key}` in interaction actions replaced
    /// by `value`.
    pub fn substitute(&self, key: &str, value: &str) -> Script {
        let pattern = format!("{{{key}}}");
        Script(
            self.0
                .iter()
                .map(|step| match step {
                    ScriptStep::Interact(i) => ScriptStep::Interact(Interaction {
                        target: i.target.clone(),
                        action: i.action.replace(&pattern, value),
                    }),
                    other => other.clone(),
                })
                .collect(),
        )
    }
}

impl FromIterator<ScriptStep> for Script {
    fn from_iter<I: IntoIterator<Item = ScriptStep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// ScriptRunner
// ---------------------------------------------------------------------------

/// Result of advancing a script by one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScriptStatus {
    Running,
    Done,
    /// The step at this index waited longer than its timeout.
    TimedOut(usize),
}

/// Cursor into a [`Script`].
#[derive(Clone, Debug, Default)]
pub struct ScriptRunner {
    index: usize,
    waited: u32,
    issued: bool,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the step being run.
    pub fn step(&self) -> usize {
        self.index
    }

    fn advance(&mut self) {
        self.index += 1;
        self.waited = 0;
        self.issued = false;
    }

    /// Advance `script` by one tick.
    ///
    /// Steps that only observe the world fall through to the next step in
    /// the same tick once satisfied. Interactions and walks consume the
    /// tick they are issued in, as does every tick spent waiting.
    pub fn tick<W, A>(&mut self, script: &Script, world: &W, act: &mut A) -> ScriptStatus
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        while let Some(step) = script.0.get(self.index) {
            match step {
                ScriptStep::Interact(i) => {
                    act.interact(i);
                    self.advance();
                    return ScriptStatus::Running;
                }
                ScriptStep::Delay { ticks } => {
                    if self.waited >= *ticks {
                        self.advance();
                        continue;
                    }
                    self.waited += 1;
                    return ScriptStatus::Running;
                }
                ScriptStep::WaitUntil { condition, timeout } => {
                    if condition.holds(world) {
                        self.advance();
                        continue;
                    }
                    if self.waited >= *timeout {
                        return ScriptStatus::TimedOut(self.index);
                    }
                    self.waited += 1;
                    return ScriptStatus::Running;
                }
                ScriptStep::WalkTo { position, timeout } => {
                    if world.position() == *position {
                        self.advance();
                        continue;
                    }
                    if !self.issued {
                        act.walk_to(*position);
                        self.issued = true;
                        return ScriptStatus::Running;
                    }
                    if self.waited >= *timeout {
                        return ScriptStatus::TimedOut(self.index);
                    }
                    self.waited += 1;
                    return ScriptStatus::Running;
                }
            }
        }
        ScriptStatus::Done
    }
}
