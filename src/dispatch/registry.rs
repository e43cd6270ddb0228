use std::collections::HashMap;

use crate::hlist::{HandlerList, Phase};

/// Chains registered while a request runs, for phases other than the one
/// executing at the time. Keyed by phase; created on first registration.
#[derive(Debug, Clone, Default)]
pub struct PhaseRegistry {
    chains: HashMap<Phase, HandlerList>,
}

impl PhaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_chain(&mut self, phase: Phase) -> &mut HandlerList {
        self.chains.entry(phase).or_default()
    }

    pub fn get(&self, phase: Phase) -> Option<&HandlerList> {
        self.chains
            .get(&phase)
            .filter(|c| !c.is_empty())
    }

    /// Removes and returns the chain for `phase` so it runs at most once.
    pub fn take(&mut self, phase: Phase) -> Option<HandlerList> {
        self.chains
            .remove(&phase)
            .filter(|c| !c.is_empty())
    }

    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.chains
            .values()
            .all(HandlerList::is_empty)
    }
}
