use std::str::FromStr;

/// A request-processing stage at which a handler chain may run.
///
/// Variants are listed in the order the host runs them for a request.
/// `Init` has no stage of its own; its entries run at the head of
/// `HeaderParser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    PostReadRequest,
    Trans,
    HeaderParser,
    Init,
    Access,
    Authen,
    Authz,
    Type,
    Fixup,
    Handler,
    Log,
}

/// Error for a phase name that is not one of the known phases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid phase: {0}")]
pub struct InvalidPhase(pub String);

impl Phase {
    pub const ALL: [Phase; 11] = [
        Phase::PostReadRequest,
        Phase::Trans,
        Phase::HeaderParser,
        Phase::Init,
        Phase::Access,
        Phase::Authen,
        Phase::Authz,
        Phase::Type,
        Phase::Fixup,
        Phase::Handler,
        Phase::Log,
    ];

    /// Configuration directive that declares handlers for this phase.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::PostReadRequest => "PythonPostReadRequestHandler",
            Self::Trans => "PythonTransHandler",
            Self::HeaderParser => "PythonHeaderParserHandler",
            Self::Init => "PythonInitHandler",
            Self::Access => "PythonAccessHandler",
            Self::Authen => "PythonAuthenHandler",
            Self::Authz => "PythonAuthzHandler",
            Self::Type => "PythonTypeHandler",
            Self::Fixup => "PythonFixupHandler",
            Self::Handler => "PythonHandler",
            Self::Log => "PythonLogHandler",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostReadRequest => "postreadrequest",
            Self::Trans => "trans",
            Self::HeaderParser => "headerparser",
            Self::Init => "init",
            Self::Access => "access",
            Self::Authen => "authen",
            Self::Authz => "authz",
            Self::Type => "type",
            Self::Fixup => "fixup",
            Self::Handler => "handler",
            Self::Log => "log",
        }
    }

    /// Callable looked up when a handler reference names only a module.
    pub fn default_callable(&self) -> &'static str {
        match self {
            Self::PostReadRequest => "postreadrequesthandler",
            Self::Trans => "transhandler",
            Self::HeaderParser => "headerparserhandler",
            Self::Init => "inithandler",
            Self::Access => "accesshandler",
            Self::Authen => "authenhandler",
            Self::Authz => "authzhandler",
            Self::Type => "typehandler",
            Self::Fixup => "fixuphandler",
            Self::Handler => "handler",
            Self::Log => "loghandler",
        }
    }

    /// Runs before the request is mapped onto a directory, so only
    /// server-level configuration applies.
    pub fn is_server_scope(&self) -> bool {
        matches!(self, Self::PostReadRequest | Self::Trans)
    }

    pub fn from_directive(directive: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.directive().eq_ignore_ascii_case(directive))
    }
}

impl FromStr for Phase {
    type Err = InvalidPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_directive(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|p| p.as_str().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| InvalidPhase(s.to_string()))
    }
}

impl TryFrom<&str> for Phase {
    type Error = InvalidPhase;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.directive())
    }
}
