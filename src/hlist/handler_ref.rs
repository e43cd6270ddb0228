use super::Phase;
use crate::dispatch::ResolutionError;

/// A parsed `module::callable` handler reference.
///
/// Without `::` the callable defaults to the phase's default callable, so
/// `PythonAuthenHandler myapp` resolves to `myapp::authenhandler`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    module: String,
    callable: String,
}

impl HandlerRef {
    pub fn new(module: impl Into<String>, callable: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            callable: callable.into(),
        }
    }

    pub fn parse(reference: &str, phase: Phase) -> Result<Self, ResolutionError> {
        let reference = reference.trim();

        let (module, callable) =
            match memchr::memmem::find(reference.as_bytes(), b"::") {
                Some(pos) => (&reference[..pos], reference[pos + 2..].trim()),
                None => (reference, phase.default_callable()),
            };

        let module = module.trim();
        if module.is_empty() || callable.is_empty() {
            return Err(ResolutionError::InvalidReference(reference.to_string()));
        }

        Ok(Self::new(module, callable))
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn callable(&self) -> &str {
        &self.callable
    }
}

impl std::fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.module, self.callable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_callable() {
        let r = HandlerRef::parse("myapp.views::index", Phase::Handler).unwrap();
        assert_eq!(r.module(), "myapp.views");
        assert_eq!(r.callable(), "index");
        assert_eq!(r.to_string(), "myapp.views::index");
    }

    #[test]
    fn callable_defaults_to_phase() {
        let r = HandlerRef::parse("auth", Phase::Authen).unwrap();
        assert_eq!(r.callable(), "authenhandler");
    }

    #[test]
    fn empty_parts_are_rejected() {
        for reference in ["", "  ", "::index", "mod::"] {
            assert!(
                matches!(
                    HandlerRef::parse(reference, Phase::Handler),
                    Err(ResolutionError::InvalidReference(_))
                ),
                "{:?} should be rejected",
                reference
            );
        }
    }
}
