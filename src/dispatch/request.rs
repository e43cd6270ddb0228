use std::collections::TryReserveError;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, trace, warn};

use super::{DispatchError, HandlerError};
use crate::config::DirConfig;
use crate::execution::{qualify, HandlerMessage, LogLevel, RequestContext};
use crate::hlist::{HandlerEntry, HandlerList, Phase};

/// What a running handler sees: the request, the phase being dispatched,
/// its own entry, and the configuration of the directory it was declared in.
pub struct Request<'a> {
    phase: Phase,
    entry: HandlerEntry,
    chain: &'a mut HandlerList,
    context: &'a mut RequestContext,
    scope: &'a DirConfig,
    alloc_failure: Option<TryReserveError>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(
        phase: Phase,
        entry: HandlerEntry,
        chain: &'a mut HandlerList,
        context: &'a mut RequestContext,
        scope: &'a DirConfig,
    ) -> Self {
        Self {
            phase,
            entry,
            chain,
            context,
            scope,
            alloc_failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The entry currently being run.
    pub fn entry(&self) -> &HandlerEntry {
        &self.entry
    }

    /// The chain being dispatched, including anything appended so far.
    pub fn chain(&self) -> &HandlerList {
        self.chain
    }

    /// Merged configuration of the directory the running handler was
    /// declared in. This can differ from the directory the request maps to.
    pub fn dir_config(&self) -> &DirConfig {
        self.scope
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.scope.option(key)
    }

    pub fn uri(&self) -> &str {
        self.context.uri()
    }

    pub fn context(&self) -> &RequestContext {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut RequestContext {
        self.context
    }

    /// Registers another handler for this request.
    ///
    /// If `phase` is the phase being dispatched the entry is appended to the
    /// live chain and runs after everything already queued. Otherwise it is
    /// kept until that phase runs. `directory` defaults to the directory of
    /// the calling handler.
    pub fn add_handler(
        &mut self,
        phase: Phase,
        handler: &str,
        directory: Option<&str>,
    ) -> Result<(), DispatchError> {
        let directory = directory.or(self.entry.directory());

        let result = if phase == self.phase || runs_in(phase) == self.phase {
            #[cfg(feature = "tracing")]
            trace!(%phase, handler, "Appending to running chain");

            let mut entry = HandlerEntry::new(handler, directory, false);
            if phase == Phase::Init {
                entry = qualify(&entry, phase);
            }
            self.chain
                .try_reserve(1)
                .map(|()| self.chain.push(entry))
        } else {
            #[cfg(feature = "tracing")]
            debug!(%phase, handler, "Deferring handler to later phase");

            self.context
                .dynamic
                .get_or_create_chain(phase)
                .try_append(handler, directory, false)
        };

        result.map(|_| ()).map_err(|err| {
            self.alloc_failure = Some(err.clone());
            DispatchError::Allocation(err)
        })
    }

    /// Same as [`add_handler`](Self::add_handler) with the phase given by
    /// name, e.g. `"PythonFixupHandler"`.
    pub fn add_handler_by_name(
        &mut self,
        phase: &str,
        handler: &str,
        directory: Option<&str>,
    ) -> Result<(), DispatchError> {
        let phase = phase.parse::<Phase>()?;
        self.add_handler(phase, handler, directory)
    }

    pub fn log_error(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = HandlerMessage::new(level, message).from_handler(self.entry.handler());

        #[cfg(feature = "tracing")]
        {
            let handler = self.entry.handler();
            match message.level {
                l if l.is_error_or_worse() => error!(handler, "{}", message.message),
                LogLevel::Warning => warn!(handler, "{}", message.message),
                LogLevel::Notice | LogLevel::Info => info!(handler, "{}", message.message),
                _ => debug!(handler, "{}", message.message),
            }
        }

        self.context.messages.push(message);
    }

    /// Registers `cleanup` to run once the request is finished, after the
    /// `Log` phase, whether or not dispatch succeeded. Cleanups run in
    /// reverse order of registration. A failing cleanup is recorded as an
    /// error message on the request and does not affect its result.
    pub fn register_cleanup<F>(&mut self, cleanup: F)
    where
        F: FnOnce(&RequestContext) -> Result<(), HandlerError> + Send + 'static,
    {
        #[cfg(feature = "tracing")]
        trace!(handler = self.entry.handler(), "Registering cleanup");

        self.context
            .push_cleanup(self.entry.handler(), Box::new(cleanup));
    }

    pub fn note(&self, key: &str) -> Option<&str> {
        self.context.get_note(key)
    }

    pub fn set_note(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.set_note(key, value);
    }

    /// Asks for the request to be restarted at `uri` once the current phase
    /// finishes. The remaining phases of this request are skipped.
    pub fn internal_redirect(&mut self, uri: impl Into<String>) {
        self.context.redirect = Some(uri.into());
    }

    pub(crate) fn take_alloc_failure(&mut self) -> Option<TryReserveError> {
        self.alloc_failure.take()
    }

    #[cfg(test)]
    pub(crate) fn fail_allocation(&mut self, err: TryReserveError) {
        self.alloc_failure = Some(err);
    }
}

/// Phase whose chain actually carries entries for `phase`.
fn runs_in(phase: Phase) -> Phase {
    match phase {
        Phase::Init => Phase::HeaderParser,
        other => other,
    }
}
