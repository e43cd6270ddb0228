/// Stable address of a node inside a [`HandlerList`](super::HandlerList).
///
/// Ids are only meaningful for the list that issued them. A deep copy
/// re-issues ids in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(super) usize);

/// One handler declaration: what to call, where it was declared, and
/// whether a failure to resolve it should be ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerEntry {
    handler: String,
    directory: Option<String>,
    silent: bool,
}

impl HandlerEntry {
    pub fn new(
        handler: impl Into<String>,
        directory: Option<&str>,
        silent: bool,
    ) -> Self {
        Self {
            handler: handler.into(),
            directory: directory.map(str::to_owned),
            silent,
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

impl std::fmt::Display for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.handler)?;
        if let Some(dir) = &self.directory {
            write!(f, " ({})", dir)?;
        }
        if self.silent {
            write!(f, " [silent]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(super) struct Node {
    pub(super) entry: HandlerEntry,
    pub(super) next: Option<EntryId>,
}
