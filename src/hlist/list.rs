use std::collections::TryReserveError;

use super::entry::{EntryId, HandlerEntry, Node};

/// An ordered, singly linked chain of handler entries for one phase.
///
/// Nodes live in an arena and are linked by [`EntryId`], so a chain can be
/// extended while a cursor is walking it: the walker re-reads `next` after
/// every step and sees anything appended behind the current node.
///
/// Chains never share nodes. [`HandlerList::copy`] (and `Clone`) duplicate
/// every entry, which is what lets a request mutate its working chain without
/// touching the configuration template it came from.
#[derive(Debug, Default)]
pub struct HandlerList {
    nodes: Vec<Node>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
}

impl HandlerList {
    /// Starts a one-entry chain.
    pub fn new(handler: &str, directory: Option<&str>, silent: bool) -> Self {
        let mut list = Self::empty();
        list.append(handler, directory, silent);
        list
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Links a new entry after the current tail and returns its id.
    pub fn append(
        &mut self,
        handler: &str,
        directory: Option<&str>,
        silent: bool,
    ) -> EntryId {
        self.push(HandlerEntry::new(handler, directory, silent))
    }

    /// Like [`append`](Self::append) but reports allocation failure instead
    /// of aborting. Used for entries registered while a request is running.
    pub fn try_append(
        &mut self,
        handler: &str,
        directory: Option<&str>,
        silent: bool,
    ) -> Result<EntryId, TryReserveError> {
        self.try_reserve(1)?;
        Ok(self.append(handler, directory, silent))
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.nodes.try_reserve(additional)
    }

    pub fn push(&mut self, entry: HandlerEntry) -> EntryId {
        let id = EntryId(self.nodes.len());
        self.nodes.push(Node { entry, next: None });

        match self.tail {
            Some(tail) => self.nodes[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        id
    }

    /// Appends deep copies of every entry of `other`, in order.
    pub fn extend_from(&mut self, other: &HandlerList) {
        for entry in other.iter() {
            self.push(entry.clone());
        }
    }

    /// Deep copy. The result shares no storage with `self` and its ids are
    /// renumbered in chain order.
    pub fn copy(&self) -> HandlerList {
        let mut out = HandlerList {
            nodes: Vec::with_capacity(self.len()),
            head: None,
            tail: None,
        };
        out.extend_from(self);
        out
    }

    pub fn head(&self) -> Option<EntryId> {
        self.head
    }

    pub fn tail(&self) -> Option<EntryId> {
        self.tail
    }

    pub fn get(&self, id: EntryId) -> Option<&HandlerEntry> {
        self.nodes
            .get(id.0)
            .map(|n| &n.entry)
    }

    pub fn next_of(&self, id: EntryId) -> Option<EntryId> {
        self.nodes
            .get(id.0)
            .and_then(|n| n.next)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

impl Clone for HandlerList {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<'a> IntoIterator for &'a HandlerList {
    type Item = &'a HandlerEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks a chain by following live `next` links.
pub struct Iter<'a> {
    list: &'a HandlerList,
    cursor: Option<EntryId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a HandlerEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.list.next_of(id);
        self.list.get(id)
    }
}

/// Appends to a possibly absent chain, creating it on first use.
///
/// Returns the id of the new tail so callers can keep appending or resume
/// from it.
pub fn append(
    list: &mut Option<HandlerList>,
    handler: &str,
    directory: Option<&str>,
    silent: bool,
) -> EntryId {
    list.get_or_insert_with(HandlerList::empty)
        .append(handler, directory, silent)
}
