//! Runs handler chains against requests.
//!
//! Configuration chains are templates; every request dispatches its own deep
//! copy (see [`copy_chain_for_request`]), so handlers can add entries without
//! affecting other requests.

use std::collections::TryReserveError;

use thiserror::Error;

mod dispatcher;
mod handler;
mod registry;
mod request;

pub use dispatcher::Dispatcher;
pub use handler::{Handler, HandlerError, HandlerTable, Resolver};
pub use registry::PhaseRegistry;
pub use request::Request;

use crate::execution::Status;
use crate::hlist::{HandlerList, HandlerRef, InvalidPhase, Phase};

/// Why a handler reference could not be turned into a callable.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("Invalid handler reference: {0:?}")]
    InvalidReference(String),

    #[error("No module named {0}")]
    ModuleNotFound(String),

    #[error("No callable named {0}")]
    CallableNotFound(HandlerRef),

    #[error("Failed to load {handler}: {reason}")]
    LoadFailed { handler: String, reason: String },
}

/// Errors that end a phase (or the whole request).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("Cannot resolve handler {handler}: {source}")]
    Resolution {
        handler: String,
        #[source]
        source: ResolutionError,
    },

    #[error("Handler {handler} failed in {phase}: {source}")]
    HandlerRuntime {
        handler: String,
        phase: Phase,
        #[source]
        source: HandlerError,
    },

    #[error("Failed to allocate handler entry")]
    Allocation(#[source] TryReserveError),

    #[error(transparent)]
    InvalidPhase(#[from] InvalidPhase),

    #[error("Internal redirect limit of {0} exceeded")]
    RedirectLimit(usize),
}

impl DispatchError {
    /// Status the request lifecycle should answer with.
    pub fn status(&self) -> Status {
        Status::INTERNAL_SERVER_ERROR
    }

    /// Whether the failure leaves the whole request unusable, not just the
    /// phase.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, Self::Allocation(_) | Self::RedirectLimit(_))
    }
}

/// Deep-copies a configured template chain into a request's private
/// working chain. An absent template yields an empty chain.
pub fn copy_chain_for_request(template: Option<&HandlerList>) -> HandlerList {
    template
        .map(HandlerList::copy)
        .unwrap_or_default()
}
