mod context;
mod hooks;
mod message;
mod outcome;
mod status;

pub(crate) use context::qualify;
pub use context::{RequestContext, MAX_INTERNAL_REDIRECTS};
pub use hooks::{DispatchHooks, InvocationCallback, NoOpHooks};
pub use message::{HandlerMessage, LogLevel};
pub use outcome::Outcome;
pub use status::Status;
