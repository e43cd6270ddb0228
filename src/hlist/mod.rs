//! Handler lists: ordered per-phase chains of handler declarations.

mod entry;
mod handler_ref;
mod list;
mod phase;

pub use entry::{EntryId, HandlerEntry};
pub use handler_ref::HandlerRef;
pub use list::{append, HandlerList, Iter};
pub use phase::{InvalidPhase, Phase};
