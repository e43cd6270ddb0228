/// Handler return code, following the host server's conventions.
///
/// Non-positive values are control codes; positive values are HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(i32);

impl Status {
    /// Handled; keep running the chain.
    pub const OK: Status = Status(0);
    /// Not handled by this handler; keep running the chain. Also what a phase
    /// reports when nothing handled it.
    pub const DECLINED: Status = Status(-1);
    /// Request fully served; skip the remaining phases.
    pub const DONE: Status = Status(-2);

    pub const HTTP_OK: Status = Status(200);
    pub const MOVED_TEMPORARILY: Status = Status(302);
    pub const BAD_REQUEST: Status = Status(400);
    pub const UNAUTHORIZED: Status = Status(401);
    pub const FORBIDDEN: Status = Status(403);
    pub const NOT_FOUND: Status = Status(404);
    pub const INTERNAL_SERVER_ERROR: Status = Status(500);

    pub const fn from_raw(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> i32 {
        self.0
    }

    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }

    pub fn is_declined(&self) -> bool {
        *self == Self::DECLINED
    }

    /// Whether this code ends the phase when a handler returns it.
    pub fn stops_chain(&self) -> bool {
        !self.is_ok() && !self.is_declined()
    }

    pub fn is_http(&self) -> bool {
        (100..600).contains(&self.0)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.0)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match *self {
            Self::OK => Some("OK"),
            Self::DECLINED => Some("DECLINED"),
            Self::DONE => Some("DONE"),
            _ => None,
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self::from_raw(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_str() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(feature = "http")]
impl Status {
    /// HTTP status for this code. Control codes map to 200 except
    /// `DECLINED`, which has no response of its own.
    pub fn to_http(&self) -> Option<http::StatusCode> {
        match *self {
            Self::OK | Self::DONE => Some(http::StatusCode::OK),
            Self::DECLINED => None,
            Self(code) => u16::try_from(code)
                .ok()
                .and_then(|c| http::StatusCode::from_u16(c).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_codes() {
        assert!(!Status::OK.stops_chain());
        assert!(!Status::DECLINED.stops_chain());
        assert!(Status::DONE.stops_chain());
        assert!(Status::FORBIDDEN.stops_chain());
        assert_eq!(Status::DECLINED.to_string(), "DECLINED");
        assert_eq!(Status::from(403).to_string(), "403");
    }

    #[test]
    fn http_classes() {
        assert!(Status::FORBIDDEN.is_client_error());
        assert!(Status::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(Status::MOVED_TEMPORARILY.is_redirect());
        assert!(!Status::OK.is_http());
    }

    #[cfg(feature = "http")]
    #[test]
    fn maps_to_http() {
        assert_eq!(Status::FORBIDDEN.to_http(), Some(http::StatusCode::FORBIDDEN));
        assert_eq!(Status::DONE.to_http(), Some(http::StatusCode::OK));
        assert_eq!(Status::DECLINED.to_http(), None);
        assert_eq!(Status::from(-7).to_http(), None);
    }
}
