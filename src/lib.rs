//! Handler-chain dispatch for embedding a scripting runtime in Apache httpd.
//!
//! Configuration declares, per directory and per request phase, an ordered
//! chain of handler references (`PythonHandler app other::run`). For every
//! request the dispatcher deep-copies the chain it is about to run, walks it
//! in order, and folds the handlers' results into an [`Outcome`]. Handlers
//! can extend the running chain or queue handlers for later phases; those
//! changes live only in the request's own copy.
//!
//! # Execution Model
//!
//! One worker dispatches one request at a time and walks a chain strictly
//! in order. Configuration is loaded once and shared read-only; all mutable
//! dispatch state belongs to a single [`RequestContext`].
//!
//! # Example
//!
//! ```
//! use modscript::{
//!     ConfigScope, DirConfig, Dispatcher, HandlerTable, Phase, RequestContext, Status,
//! };
//!
//! let config = ConfigScope::new(DirConfig::server())
//!     .with_section(
//!         DirConfig::builder()
//!             .with_directory("/var/www")
//!             .with_handler(Phase::Handler, "app")
//!             .build()
//!             .expect("config"),
//!     )
//!     .expect("section");
//!
//! let handlers = HandlerTable::new().with("app", "handler", |req| {
//!     req.set_note("served-by", "app");
//!     Ok(Status::OK)
//! });
//!
//! let dispatcher = Dispatcher::new(config, handlers);
//! let mut req = RequestContext::new("/index").in_directory("/var/www");
//!
//! let status = dispatcher.run_request(&mut req).expect("dispatch");
//! assert_eq!(status, Status::OK);
//! assert_eq!(req.get_note("served-by"), Some("app"));
//! ```

pub mod config;
pub mod dispatch;
pub mod execution;
pub mod hlist;

pub use config::{ConfigError, ConfigScope, DirConfig, DirConfigBuilder, Options};

pub use dispatch::{
    copy_chain_for_request, DispatchError, Dispatcher, Handler, HandlerError,
    HandlerTable, PhaseRegistry, Request, ResolutionError, Resolver,
};

pub use execution::{
    DispatchHooks, HandlerMessage, InvocationCallback, LogLevel, NoOpHooks,
    Outcome, RequestContext, Status,
};

pub use hlist::{EntryId, HandlerEntry, HandlerList, HandlerRef, InvalidPhase, Phase};

pub mod prelude {
    pub use crate::{
        ConfigScope, DirConfig, DispatchError, DispatchHooks, Dispatcher,
        Handler, HandlerError, HandlerList, HandlerTable, LogLevel, Outcome,
        Phase, Request, RequestContext, Resolver, Status,
    };
}
