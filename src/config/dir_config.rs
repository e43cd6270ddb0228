use std::collections::HashMap;

use super::{ConfigError, Options};
use crate::hlist::{HandlerList, Phase};

/// Handler and option configuration for one directory scope.
///
/// The chains held here are templates: they are filled once while the
/// configuration loads and only ever copied afterwards.
#[derive(Debug, Clone, Default)]
pub struct DirConfig {
    directory: Option<String>,
    chains: HashMap<Phase, HandlerList>,
    options: Options,
}

impl DirConfig {
    /// Server-level scope (no directory).
    pub fn server() -> Self {
        Self::default()
    }

    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Default::default()
        }
    }

    pub fn builder() -> DirConfigBuilder {
        DirConfigBuilder::default()
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    /// Appends every whitespace-separated handler in `value` to `phase`,
    /// declared in this scope's directory. Returns how many were added.
    pub fn add_handlers(
        &mut self,
        phase: Phase,
        value: &str,
    ) -> Result<usize, ConfigError> {
        let mut added = 0;
        let directory = self.directory.clone();
        let chain = self
            .chains
            .entry(phase)
            .or_default();

        for handler in value.split_whitespace() {
            chain.append(handler, directory.as_deref(), false);
            added += 1;
        }

        if added == 0 {
            return Err(ConfigError::EmptyHandler(phase.directive()));
        }

        Ok(added)
    }

    /// Registers `module` as a silent handler for every phase. Phases where
    /// the module has no matching callable are skipped without error.
    pub fn add_handler_module(&mut self, module: &str) {
        let directory = self.directory.clone();
        for phase in Phase::ALL {
            self.get_or_create_chain(phase)
                .append(module, directory.as_deref(), true);
        }
    }

    pub fn get_or_create_chain(&mut self, phase: Phase) -> &mut HandlerList {
        self.chains.entry(phase).or_default()
    }

    pub fn chain(&self, phase: Phase) -> Option<&HandlerList> {
        self.chains
            .get(&phase)
            .filter(|c| !c.is_empty())
    }

    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL
            .into_iter()
            .filter(|p| self.chain(*p).is_some())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key)
    }

    /// Effective configuration of `child` nested inside `parent`.
    ///
    /// A phase configured in the child replaces the parent's chain for that
    /// phase outright. Options are overlaid key by key. Entries keep the
    /// directory they were declared in.
    pub fn merge(parent: &DirConfig, child: &DirConfig) -> DirConfig {
        let mut merged = parent.clone();

        if child.directory.is_some() {
            merged.directory = child.directory.clone();
        }

        for (phase, chain) in &child.chains {
            if !chain.is_empty() {
                merged.chains.insert(*phase, chain.copy());
            }
        }

        merged.options.overlay(&child.options);
        merged
    }
}

/// Collects raw directives and validates them in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct DirConfigBuilder {
    directory: Option<String>,
    directives: Vec<(String, String)>,
    handler_modules: Vec<String>,
    options: Vec<(String, Option<String>)>,
}

impl DirConfigBuilder {
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Adds a handler directive such as `PythonHandler` with its value.
    #[must_use]
    pub fn with_directive(
        mut self,
        directive: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.directives
            .push((directive.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_handler(self, phase: Phase, value: impl Into<String>) -> Self {
        self.with_directive(phase.directive(), value)
    }

    #[must_use]
    pub fn with_handler_module(mut self, module: impl Into<String>) -> Self {
        self.handler_modules
            .push(module.into());
        self
    }

    #[must_use]
    pub fn with_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options
            .push((key.into(), Some(value.into())));
        self
    }

    #[must_use]
    pub fn without_option(mut self, key: impl Into<String>) -> Self {
        self.options.push((key.into(), None));
        self
    }

    pub fn build(self) -> Result<DirConfig, ConfigError> {
        let mut config = DirConfig {
            directory: self.directory,
            ..Default::default()
        };

        for (directive, value) in &self.directives {
            let phase = directive.parse::<Phase>()?;
            config.add_handlers(phase, value)?;
        }

        for module in &self.handler_modules {
            if module.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "PythonHandlerModule".to_string(),
                    reason: "module name is empty".to_string(),
                });
            }
            config.add_handler_module(module.trim());
        }

        for (key, value) in self.options {
            match value {
                Some(value) => {
                    config.options.set(key, value);
                }
                None => {
                    config.options.unset(&key);
                }
            }
        }

        Ok(config)
    }
}
