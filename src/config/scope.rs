use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::{ConfigError, DirConfig};
use crate::hlist::{HandlerList, Phase};

/// Everything loaded from one configuration pass: the server-level scope
/// plus per-directory sections.
///
/// Built single-threaded before any request runs and read-only afterwards,
/// so workers share it behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct ConfigScope {
    server: DirConfig,
    sections: BTreeMap<String, DirConfig>,
    /// Each section merged with the server config and its ancestors.
    /// Built on first lookup, dropped by every mutation.
    resolved: OnceLock<BTreeMap<String, DirConfig>>,
}

impl ConfigScope {
    pub fn new(server: DirConfig) -> Self {
        Self {
            server,
            sections: BTreeMap::new(),
            resolved: OnceLock::new(),
        }
    }

    /// Adds a directory section, replacing any earlier section for the same
    /// path.
    pub fn with_section(mut self, section: DirConfig) -> Result<Self, ConfigError> {
        let directory = section
            .directory()
            .map(normalize)
            .ok_or(ConfigError::MissingDirectory)?;

        self.sections
            .insert(directory, section);
        self.resolved.take();
        Ok(self)
    }

    pub fn server(&self) -> &DirConfig {
        &self.server
    }

    pub fn section(&self, directory: &str) -> Option<&DirConfig> {
        self.sections.get(&normalize(directory))
    }

    pub fn sections(&self) -> impl Iterator<Item = &DirConfig> {
        self.sections.values()
    }

    /// Returns the template chain for `phase` declared exactly in
    /// `directory` (or at server level for `None`), creating the section
    /// and the chain if needed.
    pub fn get_or_create_chain(
        &mut self,
        phase: Phase,
        directory: Option<&str>,
    ) -> &mut HandlerList {
        self.resolved.take();

        let scope = match directory {
            None => &mut self.server,
            Some(dir) => {
                let dir = normalize(dir);
                self.sections
                    .entry(dir.clone())
                    .or_insert_with(|| DirConfig::new(dir))
            }
        };

        scope.get_or_create_chain(phase)
    }

    /// Effective template chain for a request mapped to `directory`.
    ///
    /// The innermost scope that configures `phase` wins. Server-scope phases
    /// only consult the server-level configuration.
    pub fn chain(&self, phase: Phase, directory: Option<&str>) -> Option<&HandlerList> {
        if phase.is_server_scope() {
            return self.server.chain(phase);
        }

        self.ancestors(directory)
            .filter_map(|scope| scope.chain(phase))
            .last()
            .or_else(|| self.server.chain(phase))
    }

    /// The merged configuration a handler declared in `directory` runs
    /// under: the innermost enclosing section merged over its ancestors and
    /// the server config.
    pub fn dir_config(&self, directory: Option<&str>) -> &DirConfig {
        let innermost = self
            .ancestors(directory)
            .last()
            .and_then(DirConfig::directory)
            .map(normalize);

        match innermost {
            Some(path) => self
                .resolved()
                .get(&path)
                .unwrap_or(&self.server),
            None => &self.server,
        }
    }

    fn resolved(&self) -> &BTreeMap<String, DirConfig> {
        self.resolved.get_or_init(|| {
            self.sections
                .keys()
                .map(|path| {
                    let merged = self
                        .ancestors(Some(path.as_str()))
                        .fold(self.server.clone(), |acc, scope| {
                            DirConfig::merge(&acc, scope)
                        });
                    (path.clone(), merged)
                })
                .collect()
        })
    }

    /// Sections enclosing `directory`, outermost first. Every ancestor path
    /// is a prefix of `directory`, and prefixes sort before the paths that
    /// extend them, so map order is nesting order.
    fn ancestors<'a>(
        &'a self,
        directory: Option<&str>,
    ) -> impl Iterator<Item = &'a DirConfig> + 'a {
        let target = directory.map(normalize);

        self.sections
            .iter()
            .filter(move |(path, _)| {
                target
                    .as_deref()
                    .is_some_and(|t| encloses(path, t))
            })
            .map(|(_, scope)| scope)
    }
}

fn normalize(directory: &str) -> String {
    let trimmed = directory.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn encloses(section: &str, directory: &str) -> bool {
    if section == "/" {
        return directory.starts_with('/');
    }

    match directory.strip_prefix(section) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encloses_respects_path_boundaries() {
        assert!(encloses("/var/www", "/var/www"));
        assert!(encloses("/var/www", "/var/www/app"));
        assert!(!encloses("/var/www", "/var/wwwroot"));
        assert!(encloses("/", "/anything"));
    }

    #[test]
    fn dir_config_is_resolved_once() {
        let mut scope = ConfigScope::default()
            .with_section(
                DirConfig::builder()
                    .with_directory("/app")
                    .with_option("level", "app")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let first: *const DirConfig = scope.dir_config(Some("/app/a"));
        let second: *const DirConfig = scope.dir_config(Some("/app/b"));
        assert_eq!(first, second);

        scope
            .get_or_create_chain(Phase::Fixup, Some("/app/b"))
            .append("late", Some("/app/b"), false);

        let inner = scope.dir_config(Some("/app/b/c"));
        assert_eq!(inner.directory(), Some("/app/b"));
        assert_eq!(inner.option("level"), Some("app"));
        assert_eq!(inner.chain(Phase::Fixup).map(HandlerList::len), Some(1));
    }

    #[test]
    fn normalize_trims_trailing_slashes() {
        assert_eq!(normalize("/var/www/"), "/var/www");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
    }
}
