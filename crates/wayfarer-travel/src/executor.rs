//! Tick-driven execution of a composed [`Route`].
//!
//! The executor is an explicit state machine. [`transition`] is the pure part:
//! it maps a state and an event to the next state and is tested on its own.
//! [`StepExecutor`] observes the world once per tick, derives events, and
//! issues at most one actuator command per tick.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wayfarer_core::Position;

use crate::cancel::CancelToken;
use crate::config::ExecutorConfig;
use crate::context::NavContext;
use crate::route::{Leg, Route};
use crate::script::{ScriptRunner, ScriptStatus};
use crate::transport::EdgeId;
use crate::world::{Actuator, WorldState};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Walking,
    /// Standing at the origin of an edge, about to start its script.
    AtTransportEdge(EdgeId),
    /// Running the script of an edge.
    Traversing(EdgeId),
    Arrived,
    Cancelled,
    Failed,
}

impl State {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Arrived | State::Cancelled | State::Failed)
    }
}

/// What the route holds next, as far as the state machine cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Next {
    Walk,
    Edge(EdgeId),
    /// Nothing left and the agent is at the goal.
    End,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Execution starts.
    Start(Next),
    /// The current walk run or edge finished.
    LegDone(Next),
    /// The agent is in place to use the edge.
    Board,
    /// A fresh route replaced the current one.
    Replanned(Next),
    Cancel,
    Fail,
}

fn enter(next: Next) -> State {
    match next {
        Next::Walk => State::Walking,
        Next::Edge(id) => State::AtTransportEdge(id),
        Next::End => State::Arrived,
    }
}

/// The executor's state machine.
///
/// Terminal states absorb every event. Events that make no sense in a state
/// leave it unchanged.
pub fn transition(state: State, event: Event) -> State {
    use State::*;

    if state.is_terminal() {
        return state;
    }
    match (state, event) {
        (_, Event::Cancel) => Cancelled,
        (_, Event::Fail) => Failed,
        (Idle, Event::Start(next)) => enter(next),
        (Walking | Traversing(_), Event::LegDone(next)) => enter(next),
        (AtTransportEdge(id), Event::Board) => Traversing(id),
        (Walking | AtTransportEdge(_) | Traversing(_), Event::Replanned(next)) => enter(next),
        (s, _) => s,
    }
}

/// What a tick achieved, as seen by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The agent got stuck and a new route was composed.
    Replanned,
    Arrived,
    Cancelled,
    NoPathFound,
}

impl TickOutcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TickOutcome::Arrived | TickOutcome::Cancelled | TickOutcome::NoPathFound
        )
    }
}

// ---------------------------------------------------------------------------
// StepExecutor
// ---------------------------------------------------------------------------

/// Drives one route to completion, one tick at a time.
#[derive(Debug)]
pub struct StepExecutor {
    state: State,
    route: Route,
    config: ExecutorConfig,
    cancel: CancelToken,
    rng: StdRng,
    script: ScriptRunner,
    walk_target: Option<Position>,
    last_position: Option<Position>,
    still_ticks: u32,
    replanned: bool,
    hops: u32,
    /// Ticks spent after a script finished without the agent being delivered.
    landing: u32,
    ridden: HashSet<EdgeId>,
}

impl StepExecutor {
    pub fn new(route: Route, config: ExecutorConfig, cancel: CancelToken) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            state: State::Idle,
            route,
            config,
            cancel,
            rng,
            script: ScriptRunner::new(),
            walk_target: None,
            last_position: None,
            still_ticks: 0,
            replanned: false,
            hops: 0,
            landing: 0,
            ridden: HashSet::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn goal(&self) -> Position {
        self.route.goal()
    }

    /// Every goal the journey may end at.
    pub fn goals(&self) -> &[Position] {
        self.route.goals()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether the one-shot replan has been spent.
    pub fn has_replanned(&self) -> bool {
        self.replanned
    }

    /// Edges used so far on this journey.
    pub fn ridden(&self) -> &HashSet<EdgeId> {
        &self.ridden
    }

    fn apply(&mut self, event: Event) {
        let next = transition(self.state, event);
        if next != self.state {
            debug!("{:?} -> {:?} on {:?}", self.state, next, event);
            self.state = next;
        }
    }

    /// Advance by one tick.
    pub fn tick<W, A>(&mut self, ctx: &mut NavContext, world: &W, act: &mut A) -> TickOutcome
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        match self.state {
            State::Arrived => return TickOutcome::Arrived,
            State::Cancelled => return TickOutcome::Cancelled,
            State::Failed => return TickOutcome::NoPathFound,
            _ => {}
        }
        if self.cancel.is_cancelled() {
            self.apply(Event::Cancel);
            info!("travel to {} cancelled", self.goal());
            return TickOutcome::Cancelled;
        }

        let pos = world.position();
        if self.state == State::Idle {
            let Some(next) = self.upcoming(ctx, world, pos) else {
                return self.stall(ctx, world, pos);
            };
            self.apply(Event::Start(next));
        }

        match self.state {
            State::Walking => self.walk(ctx, world, act, pos),
            State::AtTransportEdge(id) => self.board(ctx, world, act, id, pos),
            State::Traversing(id) => self.traverse(ctx, world, act, id),
            State::Arrived => self.arrived(pos),
            State::Cancelled => TickOutcome::Cancelled,
            State::Idle | State::Failed => TickOutcome::NoPathFound,
        }
    }

    /// The next leg of the current route, if any.
    fn peek(&self, pos: Position) -> Option<Next> {
        match self.route.front() {
            Some(Leg::Walk(_)) => Some(Next::Walk),
            Some(Leg::Transport(id)) => Some(Next::Edge(id)),
            None if self.route.is_arrival(pos, self.config.arrive_radius) => Some(Next::End),
            None => None,
        }
    }

    /// The next leg, composing the following stretch when the route ran out
    /// short of the goal.
    fn upcoming<W: WorldState + ?Sized>(
        &mut self,
        ctx: &mut NavContext,
        world: &W,
        pos: Position,
    ) -> Option<Next> {
        if let Some(next) = self.peek(pos) {
            return Some(next);
        }
        ctx.capture(world, pos);
        match ctx.compose_any(world, pos, self.route.goals(), &self.ridden) {
            Ok(route) => {
                debug!("continuing from {pos} with {} legs", route.len());
                self.route = route;
                self.peek(pos)
            }
            Err(e) => {
                warn!("cannot continue to {}: {e}", self.goal());
                None
            }
        }
    }

    fn walk<W, A>(&mut self, ctx: &mut NavContext, world: &W, act: &mut A, pos: Position) -> TickOutcome
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        if self.last_position == Some(pos) {
            self.still_ticks += 1;
        } else {
            self.last_position = Some(pos);
            self.still_ticks = 0;
        }
        self.route.skip_reached(pos);

        if self.route.transports().next().is_none()
            && self.route.is_arrival(pos, self.config.arrive_radius)
        {
            self.apply(Event::LegDone(Next::End));
            return self.arrived(pos);
        }

        if !matches!(self.route.front(), Some(Leg::Walk(_))) {
            let Some(next) = self.upcoming(ctx, world, pos) else {
                return self.stall(ctx, world, pos);
            };
            self.apply(Event::LegDone(next));
            return match self.state {
                State::Arrived => self.arrived(pos),
                State::AtTransportEdge(id) => self.board(ctx, world, act, id, pos),
                State::Walking => self.issue_walk(world, act),
                _ => TickOutcome::Running,
            };
        }

        if self.still_ticks >= self.config.stall_ticks {
            return self.stall(ctx, world, pos);
        }
        self.issue_walk(world, act)
    }

    /// Command a walk toward a step a random distance ahead, unless the agent
    /// is still busy with an earlier command that remains on the route.
    fn issue_walk<W, A>(&mut self, world: &W, act: &mut A) -> TickOutcome
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        let pending = self
            .walk_target
            .is_some_and(|t| self.route.walk_run().any(|p| p == t));
        if pending && !world.is_idle() {
            return TickOutcome::Running;
        }
        let lo = self.config.lookahead_min.max(1);
        let hi = self.config.lookahead_max.max(lo);
        let window = self.rng.random_range(lo..=hi) as usize;
        let Some(target) = self.route.walk_run().take(window).last() else {
            return TickOutcome::Running;
        };
        trace!("walk to {target} ({window} ahead)");
        act.walk_to(target);
        self.walk_target = Some(target);
        TickOutcome::Running
    }

    fn board<W, A>(
        &mut self,
        ctx: &mut NavContext,
        world: &W,
        act: &mut A,
        id: EdgeId,
        pos: Position,
    ) -> TickOutcome
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        let graph = Arc::clone(ctx.graph());
        let Some(edge) = graph.edge(id) else {
            warn!("route refers to unknown edge {id}");
            return self.fail();
        };
        if self.hops >= self.config.max_hops {
            warn!("hop limit of {} reached before {edge}", self.config.max_hops);
            return self.fail();
        }
        if !edge.can_board_from(pos) || !edge.is_usable(world) {
            warn!("cannot use {edge} from {pos}");
            return self.stall(ctx, world, pos);
        }
        debug!("boarding {edge} at {pos}");
        self.ridden.insert(id);
        self.hops += 1;
        self.script = ScriptRunner::new();
        self.walk_target = None;
        self.landing = 0;
        self.apply(Event::Board);
        self.traverse(ctx, world, act, id)
    }

    fn traverse<W, A>(&mut self, ctx: &mut NavContext, world: &W, act: &mut A, id: EdgeId) -> TickOutcome
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        let graph = Arc::clone(ctx.graph());
        let Some(edge) = graph.edge(id) else {
            warn!("route refers to unknown edge {id}");
            return self.fail();
        };
        match self.script.tick(&edge.script, world, act) {
            ScriptStatus::Running => TickOutcome::Running,
            ScriptStatus::TimedOut(step) => {
                let pos = world.position();
                warn!("{edge}: step {step} timed out at {pos}");
                self.stall(ctx, world, pos)
            }
            ScriptStatus::Done => {
                let pos = world.position();
                if !edge.delivered(pos) {
                    if self.landing >= self.config.stall_ticks {
                        warn!("{edge} done but {pos} is short of {}", edge.destination);
                        return self.stall(ctx, world, pos);
                    }
                    self.landing += 1;
                    trace!("{edge}: waiting to land ({})", self.landing);
                    return TickOutcome::Running;
                }
                trace!("finished {edge} at {pos}");
                if self.route.front() == Some(Leg::Transport(id)) {
                    self.route.pop_front();
                }
                self.last_position = None;
                self.still_ticks = 0;
                let Some(next) = self.upcoming(ctx, world, pos) else {
                    return self.stall(ctx, world, pos);
                };
                self.apply(Event::LegDone(next));
                match self.state {
                    State::Arrived => self.arrived(pos),
                    _ => TickOutcome::Running,
                }
            }
        }
    }

    /// Replace the route once with a fresh one from `pos`. A second stall
    /// ends the journey.
    fn stall<W: WorldState + ?Sized>(
        &mut self,
        ctx: &mut NavContext,
        world: &W,
        pos: Position,
    ) -> TickOutcome {
        if self.replanned {
            warn!("stuck at {pos} again after replanning, giving up");
            return self.fail();
        }
        warn!("stuck at {pos}, replanning to {}", self.goal());
        self.replanned = true;
        self.still_ticks = 0;
        self.last_position = Some(pos);
        self.walk_target = None;
        ctx.capture(world, pos);
        let route = match ctx.compose_any(world, pos, self.route.goals(), &self.ridden) {
            Ok(route) => route,
            Err(e) => {
                warn!("replan failed: {e}");
                return self.fail();
            }
        };
        self.route = route;
        let Some(next) = self.peek(pos) else {
            return self.fail();
        };
        self.apply(match self.state {
            State::Idle => Event::Start(next),
            _ => Event::Replanned(next),
        });
        info!("replanned from {pos}: {} legs", self.route.len());
        TickOutcome::Replanned
    }

    fn arrived(&self, pos: Position) -> TickOutcome {
        info!("arrived at {pos}");
        TickOutcome::Arrived
    }

    fn fail(&mut self) -> TickOutcome {
        self.apply(Event::Fail);
        TickOutcome::NoPathFound
    }
}
