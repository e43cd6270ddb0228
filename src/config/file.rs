use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ConfigError, ConfigScope, DirConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SectionFile {
    /// Directive name to handler list, e.g. `"PythonHandler": "app other"`.
    handlers: BTreeMap<String, String>,
    handler_modules: Vec<String>,
    options: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    server: SectionFile,
    directories: BTreeMap<String, SectionFile>,
}

impl SectionFile {
    fn into_dir_config(
        self,
        directory: Option<String>,
    ) -> Result<DirConfig, ConfigError> {
        let mut builder = DirConfig::builder();

        if let Some(directory) = directory {
            builder = builder.with_directory(directory);
        }

        for (directive, value) in self.handlers {
            builder = builder.with_directive(directive, value);
        }

        for module in self.handler_modules {
            builder = builder.with_handler_module(module);
        }

        for (key, value) in self.options {
            builder = builder.with_option(key, value);
        }

        builder.build()
    }
}

impl ConfigScope {
    /// Loads a configuration from JSON:
    ///
    /// ```json
    /// {
    ///   "server": { "handlers": { "PythonPostReadRequestHandler": "setup" } },
    ///   "directories": {
    ///     "/var/www/app": {
    ///       "handlers": { "PythonHandler": "app::index" },
    ///       "options": { "mode": "production" }
    ///     }
    ///   }
    /// }
    /// ```
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(source)?;

        let mut scope = ConfigScope::new(file.server.into_dir_config(None)?);

        for (directory, section) in file.directories {
            scope = scope.with_section(section.into_dir_config(Some(directory))?)?;
        }

        Ok(scope)
    }
}
