/// Log severity, numbered like the host's (and syslog's) levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn is_error_or_worse(&self) -> bool {
        matches!(
            self,
            Self::Emergency | Self::Alert | Self::Critical | Self::Error
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emerg",
            Self::Alert => "alert",
            Self::Critical => "crit",
            Self::Error => "error",
            Self::Warning => "warn",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line a handler asked the host to log while the request ran.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HandlerMessage {
    pub message: String,
    pub level: LogLevel,
    /// Handler that logged it, if it came from a dispatched handler.
    pub handler: Option<String>,
}

impl HandlerMessage {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            handler: None,
        }
    }

    #[must_use]
    pub fn from_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level.is_error_or_worse()
    }
}

impl std::fmt::Display for HandlerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.handler {
            Some(handler) => {
                write!(f, "[{}] {}: {}", self.level, handler, self.message)
            }
            None => write!(f, "[{}] {}", self.level, self.message),
        }
    }
}
