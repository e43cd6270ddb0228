use std::fmt;

#[cfg(feature = "tracing")]
use tracing::warn;

use super::{HandlerMessage, LogLevel};
use crate::config::ConfigScope;
use crate::dispatch::{copy_chain_for_request, DispatchError, HandlerError, PhaseRegistry};
use crate::hlist::{HandlerEntry, HandlerList, HandlerRef, Phase};

/// Internal redirects allowed before a request is abandoned.
pub const MAX_INTERNAL_REDIRECTS: usize = 10;

pub(crate) type CleanupFn =
    Box<dyn FnOnce(&RequestContext) -> Result<(), HandlerError> + Send>;

/// Cleanups registered by handlers, with the handler that registered each.
#[derive(Default)]
struct Cleanups(Vec<(String, CleanupFn)>);

impl fmt::Debug for Cleanups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|(handler, _)| handler))
            .finish()
    }
}

/// Per-request dispatch state.
///
/// Everything here belongs to one request and is dropped with it: the
/// dynamically registered chains, notes, and collected log lines. Nothing is
/// shared with other requests, so no locking is involved.
#[derive(Debug)]
pub struct RequestContext {
    uri: String,
    directory: Option<String>,
    notes: Vec<(String, String)>,
    pub(crate) messages: Vec<HandlerMessage>,
    pub(crate) dynamic: PhaseRegistry,
    pub(crate) redirect: Option<String>,
    prev: Vec<String>,
    next: Option<Box<RequestContext>>,
    cleanups: Cleanups,
}

impl RequestContext {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            directory: None,
            notes: Vec::new(),
            messages: Vec::new(),
            dynamic: PhaseRegistry::new(),
            redirect: None,
            prev: Vec::new(),
            next: None,
            cleanups: Cleanups::default(),
        }
    }

    /// Sets the configuration directory the request maps to.
    pub fn in_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_note(key, value);
        self
    }

    pub fn notes<I, K, V>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in iter {
            self.set_note(k, v);
        }
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    /// Re-maps the request, e.g. from a translation handler.
    pub fn set_directory(&mut self, directory: impl Into<String>) {
        self.directory = Some(directory.into());
    }

    pub fn set_note(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .notes
            .iter_mut()
            .find(|(k, _)| *k == key)
        {
            Some((_, v)) => *v = value,
            None => self.notes.push((key, value)),
        }
    }

    pub fn get_note(&self, key: &str) -> Option<&str> {
        self.notes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn messages(&self) -> &[HandlerMessage] {
        &self.messages
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.is_error())
    }

    /// Chains registered during this request for phases that had not run
    /// yet.
    pub fn dynamic_handlers(&self) -> &PhaseRegistry {
        &self.dynamic
    }

    /// Dynamic chain for `phase`, created empty if nothing was registered.
    pub fn get_or_create_chain(&mut self, phase: Phase) -> &mut HandlerList {
        self.dynamic.get_or_create_chain(phase)
    }

    pub fn pending_redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub(crate) fn take_redirect(&mut self) -> Option<String> {
        self.redirect.take()
    }

    pub(crate) fn push_cleanup(&mut self, handler: &str, cleanup: CleanupFn) {
        self.cleanups
            .0
            .push((handler.to_string(), cleanup));
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.0.len()
    }

    /// Runs every registered cleanup once, most recent first. Failures are
    /// recorded as error messages.
    pub(crate) fn run_cleanups(&mut self) {
        let cleanups = std::mem::take(&mut self.cleanups.0);

        for (handler, cleanup) in cleanups.into_iter().rev() {
            if let Err(err) = cleanup(self) {
                #[cfg(feature = "tracing")]
                warn!(handler = %handler, error = %err, "Cleanup failed");

                self.messages.push(
                    HandlerMessage::new(LogLevel::Error, format!("cleanup failed: {}", err))
                        .from_handler(handler),
                );
            }
        }
    }

    /// URIs this request was internally redirected from, oldest first.
    pub fn prev(&self) -> &[String] {
        &self.prev
    }

    /// The request that replaced this one after an internal redirect.
    pub fn next(&self) -> Option<&RequestContext> {
        self.next.as_deref()
    }

    pub(crate) fn set_next(&mut self, next: RequestContext) {
        self.next = Some(Box::new(next));
    }

    /// Starts a fresh request for `uri` after an internal redirect.
    ///
    /// The new request gets its own empty working set: no dynamic handlers,
    /// notes or messages carry over. It inherits the directory mapping and
    /// the redirect history.
    pub fn for_redirect(&self, uri: impl Into<String>) -> Result<Self, DispatchError> {
        if self.prev.len() >= MAX_INTERNAL_REDIRECTS {
            return Err(DispatchError::RedirectLimit(MAX_INTERNAL_REDIRECTS));
        }

        let mut prev = self.prev.clone();
        prev.push(self.uri.clone());

        Ok(Self {
            directory: self.directory.clone(),
            prev,
            ..Self::new(uri)
        })
    }

    /// Builds the chain this request runs for `phase`: a private copy of
    /// the configured template, `Init` entries ahead of `HeaderParser`, then
    /// whatever was registered dynamically for the phase.
    pub fn working_chain(&mut self, config: &ConfigScope, phase: Phase) -> HandlerList {
        let directory = if phase.is_server_scope() {
            None
        } else {
            self.directory.as_deref()
        };

        let mut chain = HandlerList::empty();

        if phase == Phase::HeaderParser {
            let mut init = copy_chain_for_request(config.chain(Phase::Init, directory));
            if let Some(dynamic) = self.dynamic.take(Phase::Init) {
                init.extend_from(&dynamic);
            }
            for entry in &init {
                chain.push(qualify(entry, Phase::Init));
            }
        }

        chain.extend_from(&copy_chain_for_request(config.chain(phase, directory)));

        if let Some(dynamic) = self.dynamic.take(phase) {
            chain.extend_from(&dynamic);
        }

        chain
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RequestContext {{")?;
        writeln!(f, "  uri: {}", escape_control(&self.uri))?;
        if let Some(dir) = &self.directory {
            writeln!(f, "  directory: {}", dir)?;
        }

        let note_count = self.notes.len();
        if note_count == 0 {
            writeln!(f, "  notes: []")?;
        } else {
            writeln!(f, "  notes: [")?;

            let display_count = note_count.min(15);
            for (key, value) in self.notes.iter().take(display_count) {
                let escaped_value = escape_control(value);
                let truncated = if escaped_value.chars().count() > 60 {
                    let head: String = escaped_value.chars().take(57).collect();
                    format!("{}...", head)
                } else {
                    escaped_value
                };
                writeln!(f, "    {} = \"{}\"", key, truncated)?;
            }

            if note_count > display_count {
                writeln!(f, "    ... ({} more)", note_count - display_count)?;
            }
            writeln!(f, "  ]")?;
        }

        let pending: Vec<_> = self.dynamic.phases().collect();
        if !pending.is_empty() {
            writeln!(f, "  dynamic: {:?}", pending)?;
        }
        if !self.prev.is_empty() {
            writeln!(f, "  redirected from: {}", self.prev.join(" -> "))?;
        }

        writeln!(f, "  messages: {}", self.messages.len())?;
        write!(f, "}}")
    }
}

/// Pins the callable of an entry that runs inside another phase's chain, so
/// `PythonInitHandler mod` still calls `mod::inithandler`.
pub(crate) fn qualify(entry: &HandlerEntry, phase: Phase) -> HandlerEntry {
    match HandlerRef::parse(entry.handler(), phase) {
        Ok(handler) => HandlerEntry::new(
            handler.to_string(),
            entry.directory(),
            entry.is_silent(),
        ),
        Err(_) => entry.clone(),
    }
}

fn escape_control(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_control() && c != '\t' && c != '\n' {
            result.push_str(&format!("\\x{:02x}", c as u32));
        } else {
            result.push(c);
        }
    }
    result
}
