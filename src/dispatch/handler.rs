use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use super::{DispatchError, Request, ResolutionError};
use crate::config::DirConfig;
use crate::execution::Status;
use crate::hlist::HandlerRef;

/// Error a handler raises while running. Fatal to the current phase.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DispatchError> for HandlerError {
    fn from(err: DispatchError) -> Self {
        Self::with_source(err.to_string(), err)
    }
}

/// A resolved, callable handler.
pub trait Handler {
    fn call(&mut self, req: &mut Request<'_>) -> Result<Status, HandlerError>;
}

impl<F> Handler for F
where
    F: FnMut(&mut Request<'_>) -> Result<Status, HandlerError>,
{
    fn call(&mut self, req: &mut Request<'_>) -> Result<Status, HandlerError> {
        self(req)
    }
}

/// Turns a handler reference into something callable.
///
/// This is the seam to the scripting runtime: an implementation imports the
/// module (with `scope` as the configuration it was declared under) and looks
/// up the callable.
pub trait Resolver {
    fn resolve(
        &self,
        handler: &HandlerRef,
        scope: &DirConfig,
    ) -> Result<Box<dyn Handler>, ResolutionError>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(
        &self,
        handler: &HandlerRef,
        scope: &DirConfig,
    ) -> Result<Box<dyn Handler>, ResolutionError> {
        (**self).resolve(handler, scope)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(
        &self,
        handler: &HandlerRef,
        scope: &DirConfig,
    ) -> Result<Box<dyn Handler>, ResolutionError> {
        (**self).resolve(handler, scope)
    }
}

type SharedFn =
    Arc<dyn Fn(&mut Request<'_>) -> Result<Status, HandlerError> + Send + Sync>;

struct SharedHandler(SharedFn);

impl Handler for SharedHandler {
    fn call(&mut self, req: &mut Request<'_>) -> Result<Status, HandlerError> {
        (self.0)(req)
    }
}

/// In-process resolver mapping `module::callable` names to Rust functions.
#[derive(Default, Clone)]
pub struct HandlerTable {
    modules: HashMap<String, HashMap<String, SharedFn>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callable` in `module`, replacing any previous function
    /// with the same name.
    #[must_use]
    pub fn with<F>(mut self, module: &str, callable: &str, f: F) -> Self
    where
        F: Fn(&mut Request<'_>) -> Result<Status, HandlerError> + Send + Sync + 'static,
    {
        self.register(module, callable, f);
        self
    }

    pub fn register<F>(&mut self, module: &str, callable: &str, f: F) -> &mut Self
    where
        F: Fn(&mut Request<'_>) -> Result<Status, HandlerError> + Send + Sync + 'static,
    {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(callable.to_string(), Arc::new(f));
        self
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self
            .modules
            .iter()
            .flat_map(|(module, callables)| {
                callables
                    .keys()
                    .map(move |c| format!("{}::{}", module, c))
            })
            .collect();
        names.sort();

        f.debug_struct("HandlerTable")
            .field("handlers", &names)
            .finish()
    }
}

impl Resolver for HandlerTable {
    fn resolve(
        &self,
        handler: &HandlerRef,
        _scope: &DirConfig,
    ) -> Result<Box<dyn Handler>, ResolutionError> {
        let module = self
            .modules
            .get(handler.module())
            .ok_or_else(|| ResolutionError::ModuleNotFound(handler.module().to_string()))?;

        let f = module
            .get(handler.callable())
            .ok_or_else(|| ResolutionError::CallableNotFound(handler.clone()))?;

        Ok(Box::new(SharedHandler(Arc::clone(f))))
    }
}
