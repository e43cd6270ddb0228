//! Phase dispatch engine.
//!
//! Walks a working chain one entry at a time, re-entering each entry's
//! declared directory scope before calling it, and folds handler results
//! into an [`Outcome`].

use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace, warn};

use super::{DispatchError, Request, Resolver};
use crate::config::ConfigScope;
use crate::execution::{
    DispatchHooks, HandlerMessage, LogLevel, NoOpHooks, Outcome, RequestContext, Status,
};
use crate::hlist::{HandlerEntry, HandlerList, HandlerRef, Phase};

/// Result of running a single entry.
enum Step {
    Handled,
    Declined,
    Skipped,
    Stop(Status),
    Fail(DispatchError),
}

/// Dispatches handler chains for requests under one loaded configuration.
///
/// The configuration is read-only here, so one dispatcher can serve any
/// number of requests; each request brings its own [`RequestContext`].
pub struct Dispatcher<R> {
    config: Arc<ConfigScope>,
    resolver: R,
}

impl<R: Resolver> Dispatcher<R> {
    pub fn new(config: impl Into<Arc<ConfigScope>>, resolver: R) -> Self {
        Self {
            config: config.into(),
            resolver,
        }
    }

    pub fn config(&self) -> &ConfigScope {
        &self.config
    }

    pub fn run_phase(
        &self,
        phase: Phase,
        chain: &mut HandlerList,
        req: &mut RequestContext,
    ) -> Outcome {
        self.run_phase_with_hooks(phase, chain, req, &mut NoOpHooks)
    }

    /// Runs `chain` in order against `req`.
    ///
    /// The cursor follows live `next` links, so entries a handler appends
    /// to `chain` while it runs are visited too. A stop status or a failure
    /// ends the phase immediately; no handler is retried.
    pub fn run_phase_with_hooks<H: DispatchHooks + ?Sized>(
        &self,
        phase: Phase,
        chain: &mut HandlerList,
        req: &mut RequestContext,
        hooks: &mut H,
    ) -> Outcome {
        #[cfg(feature = "tracing")]
        debug!(%phase, entries = chain.len(), uri = req.uri(), "Dispatching phase");

        hooks.on_phase_starting(phase, chain);

        let mut handled = false;
        let mut fallback = None;
        let mut stopped = None;
        let mut cursor = chain.head();

        while let Some(id) = cursor {
            let Some(entry) = chain.get(id).cloned() else {
                break;
            };

            match self.invoke(phase, &entry, chain, req, hooks) {
                Step::Handled => handled = true,
                Step::Declined => {
                    if !entry.is_silent() {
                        fallback = Some(Status::DECLINED);
                    }
                }
                Step::Skipped => {}
                Step::Stop(status) => {
                    stopped = Some(Outcome::Stopped(status));
                    break;
                }
                Step::Fail(err) => {
                    #[cfg(feature = "tracing")]
                    warn!(%phase, handler = entry.handler(), error = %err, "Handler failed");

                    hooks.on_handler_failed(phase, &entry, &err);
                    stopped = Some(Outcome::Failed(err));
                    break;
                }
            }

            cursor = chain.next_of(id);
        }

        let outcome = stopped.unwrap_or_else(|| {
            let status = if handled {
                Status::OK
            } else {
                fallback.unwrap_or(Status::DECLINED)
            };
            Outcome::Completed(status)
        });

        #[cfg(feature = "tracing")]
        debug!(%phase, %outcome, "Phase finished");

        hooks.on_phase_finished(phase, &outcome);
        outcome
    }

    fn invoke<H: DispatchHooks + ?Sized>(
        &self,
        phase: Phase,
        entry: &HandlerEntry,
        chain: &mut HandlerList,
        req: &mut RequestContext,
        hooks: &mut H,
    ) -> Step {
        let scope = self.config.dir_config(entry.directory());

        let resolved = HandlerRef::parse(entry.handler(), phase)
            .and_then(|handler| self.resolver.resolve(&handler, scope));

        let mut handler = match resolved {
            Ok(handler) => handler,
            Err(err) if entry.is_silent() => {
                #[cfg(feature = "tracing")]
                trace!(%phase, handler = entry.handler(), error = %err, "Skipping silent handler");

                hooks.on_handler_skipped(phase, entry, &err);
                return Step::Skipped;
            }
            Err(err) => {
                return Step::Fail(DispatchError::Resolution {
                    handler: entry.handler().to_string(),
                    source: err,
                });
            }
        };

        #[cfg(feature = "tracing")]
        trace!(%phase, handler = entry.handler(), directory = entry.directory(), "Invoking handler");

        hooks.on_handler_invoking(phase, entry);

        let mut request = Request::new(phase, entry.clone(), chain, req, scope);
        let result = handler.call(&mut request);

        if let Some(err) = request.take_alloc_failure() {
            return Step::Fail(DispatchError::Allocation(err));
        }

        match result {
            Err(source) => Step::Fail(DispatchError::HandlerRuntime {
                handler: entry.handler().to_string(),
                phase,
                source,
            }),
            Ok(status) => {
                hooks.on_handler_returned(phase, entry, status);

                if status.stops_chain() {
                    Step::Stop(status)
                } else if status.is_declined() {
                    Step::Declined
                } else {
                    Step::Handled
                }
            }
        }
    }

    pub fn run_request_phase(&self, phase: Phase, req: &mut RequestContext) -> Outcome {
        self.run_request_phase_with_hooks(phase, req, &mut NoOpHooks)
    }

    /// Runs `phase` for `req` on a fresh working chain: a private copy of the
    /// configured chain plus anything registered for the phase earlier in
    /// the request.
    pub fn run_request_phase_with_hooks<H: DispatchHooks + ?Sized>(
        &self,
        phase: Phase,
        req: &mut RequestContext,
        hooks: &mut H,
    ) -> Outcome {
        let mut chain = req.working_chain(&self.config, phase);

        if chain.is_empty() {
            #[cfg(feature = "tracing")]
            trace!(%phase, "No handlers configured");

            return Outcome::Completed(Status::DECLINED);
        }

        self.run_phase_with_hooks(phase, &mut chain, req, hooks)
    }

    pub fn run_request(&self, req: &mut RequestContext) -> Result<Status, DispatchError> {
        self.run_request_with_hooks(req, &mut NoOpHooks)
    }

    /// Runs every phase for `req` in host order, then the request's
    /// cleanups.
    ///
    /// A stop status ends processing and becomes the result; otherwise the
    /// result is the `Handler` phase's status. `Log` runs last, even after a
    /// stop or a phase failure, but not after a request-fatal error. A
    /// pending internal redirect replaces the rest of the request with a
    /// fresh one for the new URI. Cleanups run on every exit path.
    pub fn run_request_with_hooks<H: DispatchHooks + ?Sized>(
        &self,
        req: &mut RequestContext,
        hooks: &mut H,
    ) -> Result<Status, DispatchError> {
        let result = self.run_phases(req, hooks);
        req.run_cleanups();
        result
    }

    fn run_phases<H: DispatchHooks + ?Sized>(
        &self,
        req: &mut RequestContext,
        hooks: &mut H,
    ) -> Result<Status, DispatchError> {
        #[cfg(feature = "tracing")]
        info!(uri = req.uri(), directory = req.directory(), "Processing request");

        let mut status = Status::DECLINED;
        let mut failure = None;

        for phase in Phase::ALL {
            if matches!(phase, Phase::Init | Phase::Log) {
                continue;
            }

            let outcome = self.run_request_phase_with_hooks(phase, req, hooks);

            if !outcome.is_failed() {
                if let Some(uri) = req.take_redirect() {
                    return self.follow_redirect(req, uri, hooks);
                }
            }

            match outcome {
                Outcome::Completed(s) => {
                    if phase == Phase::Handler {
                        status = s;
                    }
                }
                Outcome::Stopped(s) => {
                    status = s;
                    break;
                }
                Outcome::Failed(err) if err.is_request_fatal() => {
                    #[cfg(feature = "tracing")]
                    warn!(%phase, error = %err, "Abandoning request");

                    return Err(err);
                }
                Outcome::Failed(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let log = self.run_request_phase_with_hooks(Phase::Log, req, hooks);

        if let Some(uri) = req.take_redirect() {
            #[cfg(feature = "tracing")]
            warn!(uri = %uri, "Ignoring internal redirect requested after the request finished");

            req.messages.push(HandlerMessage::new(
                LogLevel::Warning,
                format!("Ignoring internal redirect to {}: request already finished", uri),
            ));
        }

        if let Some(err) = failure {
            return Err(err);
        }
        log.into_result()?;

        #[cfg(feature = "tracing")]
        info!(uri = req.uri(), %status, "Request finished");

        Ok(status)
    }

    fn follow_redirect<H: DispatchHooks + ?Sized>(
        &self,
        req: &mut RequestContext,
        uri: String,
        hooks: &mut H,
    ) -> Result<Status, DispatchError> {
        let mut next = req.for_redirect(uri)?;

        #[cfg(feature = "tracing")]
        info!(from = req.uri(), to = next.uri(), "Internal redirect");

        let result = self.run_request_with_hooks(&mut next, hooks);
        req.set_next(next);
        result
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sections", &self.config.sections().count())
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::TryReserveError;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::DirConfig;
    use crate::dispatch::HandlerTable;

    fn capacity_overflow() -> TryReserveError {
        Vec::<u8>::new()
            .try_reserve(usize::MAX)
            .unwrap_err()
    }

    #[test]
    fn allocation_failure_fails_phase() {
        let table = HandlerTable::new().with("app", "handler", |req| {
            req.fail_allocation(capacity_overflow());
            Ok(Status::OK)
        });
        let dispatcher = Dispatcher::new(ConfigScope::default(), table);

        let mut chain = HandlerList::new("app", None, false);
        let outcome = dispatcher.run_phase(
            Phase::Handler,
            &mut chain,
            &mut RequestContext::new("/"),
        );

        assert!(matches!(
            outcome,
            Outcome::Failed(DispatchError::Allocation(_))
        ));
    }

    #[test]
    fn allocation_failure_abandons_request_before_log() {
        let visits = Arc::new(Mutex::new(Vec::new()));

        let table = {
            let on_handler = Arc::clone(&visits);
            let on_log = Arc::clone(&visits);
            HandlerTable::new()
                .with("app", "handler", move |req| {
                    let on_cleanup = Arc::clone(&on_handler);
                    req.register_cleanup(move |_req| {
                        on_cleanup.lock().unwrap().push("cleanup");
                        Ok(())
                    });
                    req.fail_allocation(capacity_overflow());
                    Ok(Status::OK)
                })
                .with("audit", "loghandler", move |_req| {
                    on_log.lock().unwrap().push("audit");
                    Ok(Status::OK)
                })
        };
        let config = ConfigScope::new(
            DirConfig::builder()
                .with_handler(Phase::Handler, "app")
                .with_handler(Phase::Log, "audit")
                .build()
                .unwrap(),
        );
        let dispatcher = Dispatcher::new(config, table);

        let mut req = RequestContext::new("/");
        let err = dispatcher.run_request(&mut req).unwrap_err();

        assert!(matches!(err, DispatchError::Allocation(_)));
        assert!(err.is_request_fatal());
        assert_eq!(*visits.lock().unwrap(), ["cleanup"]);
    }
}
