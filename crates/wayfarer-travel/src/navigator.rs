use std::collections::HashSet;
use std::sync::Arc;

use log::{info, warn};
use wayfarer_core::Position;

use crate::cancel::CancelToken;
use crate::config::NavConfig;
use crate::context::NavContext;
use crate::error::NavError;
use crate::executor::{State, StepExecutor, TickOutcome};
use crate::graph::TransportGraph;
use crate::world::{Actuator, WorldState};

/// Entry point: accepts travel requests and drives them tick by tick.
///
/// A navigator executes at most one route at a time. Once a route reaches
/// a terminal outcome the navigator is free for the next request.
#[derive(Debug)]
pub struct Navigator {
    ctx: NavContext,
    active: Option<StepExecutor>,
}

impl Navigator {
    pub fn new(graph: Arc<TransportGraph>, config: NavConfig) -> Self {
        Self {
            ctx: NavContext::new(graph, config),
            active: None,
        }
    }

    pub fn context(&self) -> &NavContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut NavContext {
        &mut self.ctx
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// State of the running route, if any.
    pub fn state(&self) -> Option<State> {
        self.active.as_ref().map(StepExecutor::state)
    }

    pub fn executor(&self) -> Option<&StepExecutor> {
        self.active.as_ref()
    }

    /// Compose a route from the agent's position to `goal` and start
    /// executing it on the following ticks.
    ///
    /// Returns a token that cancels the journey. Fails with
    /// [`NavError::Busy`] while another route runs.
    pub fn travel_to<W: WorldState + ?Sized>(
        &mut self,
        world: &W,
        goal: Position,
    ) -> Result<CancelToken, NavError> {
        self.travel_to_any(world, &[goal])
    }

    /// Travel to whichever of `goals` turns out closest.
    pub fn travel_to_any<W: WorldState + ?Sized>(
        &mut self,
        world: &W,
        goals: &[Position],
    ) -> Result<CancelToken, NavError> {
        if self.active.is_some() {
            warn!("refusing travel to {goals:?}: already travelling");
            return Err(NavError::Busy);
        }
        let start = world.position();
        self.ctx.capture(world, start);
        let route = self.ctx.compose_any(world, start, goals, &HashSet::new())?;
        match goals {
            [goal] => info!("travelling {start} -> {goal}, {} legs", route.len()),
            _ => info!("travelling {start} -> any of {}, {} legs", goals.len(), route.len()),
        }
        let token = CancelToken::new();
        self.active = Some(StepExecutor::new(
            route,
            self.ctx.config().executor,
            token.clone(),
        ));
        Ok(token)
    }

    /// Advance the running route by one tick. Returns `None` when idle.
    pub fn tick<W, A>(&mut self, world: &W, act: &mut A) -> Option<TickOutcome>
    where
        W: WorldState + ?Sized,
        A: Actuator + ?Sized,
    {
        let exec = self.active.as_mut()?;
        let outcome = exec.tick(&mut self.ctx, world, act);
        if outcome.is_terminal() {
            self.active = None;
        }
        Some(outcome)
    }

    /// Request cancellation of the running route. It takes effect on the
    /// next tick. Returns whether a route was running.
    pub fn cancel(&self) -> bool {
        match &self.active {
            Some(exec) => {
                exec.cancel_token().cancel();
                true
            }
            None => false,
        }
    }
}
