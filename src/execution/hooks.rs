use super::{Outcome, Status};
use crate::dispatch::{DispatchError, ResolutionError};
use crate::hlist::{HandlerEntry, HandlerList, Phase};

/// No-op implementation of `DispatchHooks`.
pub struct NoOpHooks;

impl DispatchHooks for NoOpHooks {}

/// Wraps a closure as a `DispatchHooks` implementation that sees every
/// handler invocation.
pub struct InvocationCallback<F> {
    invoke_fn: F,
}

impl<F> InvocationCallback<F>
where
    F: FnMut(Phase, &HandlerEntry),
{
    pub fn new(invoke_fn: F) -> Self {
        Self { invoke_fn }
    }
}

impl<F> DispatchHooks for InvocationCallback<F>
where
    F: FnMut(Phase, &HandlerEntry),
{
    fn on_handler_invoking(&mut self, phase: Phase, entry: &HandlerEntry) {
        (self.invoke_fn)(phase, entry);
    }
}

/// Callbacks invoked while phases are dispatched.
///
/// All methods default to doing nothing. Override only what you need.
pub trait DispatchHooks {
    /// Called with the working chain before its first entry runs.
    fn on_phase_starting(&mut self, phase: Phase, chain: &HandlerList) {
        let _ = (phase, chain);
    }

    /// Called after an entry resolved, right before its handler runs.
    fn on_handler_invoking(&mut self, phase: Phase, entry: &HandlerEntry) {
        let _ = (phase, entry);
    }

    /// Called with the status a handler returned.
    fn on_handler_returned(
        &mut self,
        phase: Phase,
        entry: &HandlerEntry,
        status: Status,
    ) {
        let _ = (phase, entry, status);
    }

    /// Called when a silent entry could not be resolved and was skipped.
    fn on_handler_skipped(
        &mut self,
        phase: Phase,
        entry: &HandlerEntry,
        error: &ResolutionError,
    ) {
        let _ = (phase, entry, error);
    }

    /// Called when an entry fails the phase.
    fn on_handler_failed(
        &mut self,
        phase: Phase,
        entry: &HandlerEntry,
        error: &DispatchError,
    ) {
        let _ = (phase, entry, error);
    }

    /// Called once per phase with its final outcome.
    fn on_phase_finished(&mut self, phase: Phase, outcome: &Outcome) {
        let _ = (phase, outcome);
    }
}
