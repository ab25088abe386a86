//! # SIP Status Codes
//!
//! The subset of [RFC 3261 Section 21](https://datatracker.ietf.org/doc/html/rfc3261#section-21)
//! status codes a registering, call-answering user agent sends or expects to see,
//! together with their canonical reason phrases.
//!
//! - `1xx`: Provisional: Request received, continuing to process the request
//! - `2xx`: Success: The action was successfully received, understood, and accepted
//! - `4xx`: Client Error: The request contains bad syntax or cannot be fulfilled at this server
//! - `5xx`: Server Error: The server failed to fulfill an apparently valid request
//! - `6xx`: Global Failure: The request cannot be fulfilled at any server
//!
//! ## Examples
//!
//! ```rust
//! use wsphone_sip_core::StatusCode;
//! use std::str::FromStr;
//!
//! let status = StatusCode::Ringing;
//! assert_eq!(status.as_u16(), 180);
//! assert_eq!(status.reason_phrase(), "Ringing");
//! assert_eq!(status.status_line(), "SIP/2.0 180 Ringing");
//!
//! let status = StatusCode::from_u16(401).unwrap();
//! assert_eq!(status, StatusCode::Unauthorized);
//!
//! let status = StatusCode::from_str("486").unwrap();
//! assert_eq!(status, StatusCode::BusyHere);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::SIP_VERSION;

/// SIP status codes known to this stack
///
/// Each variant carries its numeric value as the discriminant, so the
/// conversion to `u16` is a plain cast.
///
/// # Examples
///
/// ```rust
/// use wsphone_sip_core::StatusCode;
///
/// assert!(StatusCode::Trying.is_provisional());
/// assert!(StatusCode::Ok.is_success());
/// assert!(StatusCode::Unauthorized.is_client_error());
/// assert_eq!(StatusCode::Ok.to_string(), "200 OK");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum StatusCode {
    // 1xx: Provisional
    /// 100 Trying
    Trying = 100,
    /// 180 Ringing
    Ringing = 180,
    /// 181 Call Is Being Forwarded
    CallIsBeingForwarded = 181,
    /// 182 Queued
    Queued = 182,
    /// 183 Session Progress
    SessionProgress = 183,

    // 2xx: Success
    /// 200 OK
    Ok = 200,
    /// 202 Accepted
    Accepted = 202,

    // 4xx: Client Error
    /// 400 Bad Request
    BadRequest = 400,
    /// 401 Unauthorized
    Unauthorized = 401,
    /// 403 Forbidden
    Forbidden = 403,
    /// 404 Not Found
    NotFound = 404,
    /// 407 Proxy Authentication Required
    ProxyAuthenticationRequired = 407,
    /// 408 Request Timeout
    RequestTimeout = 408,
    /// 480 Temporarily Unavailable
    TemporarilyUnavailable = 480,
    /// 481 Call/Transaction Does Not Exist
    CallOrTransactionDoesNotExist = 481,
    /// 486 Busy Here
    BusyHere = 486,
    /// 487 Request Terminated
    RequestTerminated = 487,
    /// 488 Not Acceptable Here
    NotAcceptableHere = 488,

    // 5xx: Server Error
    /// 500 Server Internal Error
    ServerInternalError = 500,
    /// 503 Service Unavailable
    ServiceUnavailable = 503,

    // 6xx: Global Failure
    /// 603 Decline
    Decline = 603,
}

/// Every status code in the table, in ascending numeric order
pub const ALL_STATUS_CODES: &[StatusCode] = &[
    StatusCode::Trying,
    StatusCode::Ringing,
    StatusCode::CallIsBeingForwarded,
    StatusCode::Queued,
    StatusCode::SessionProgress,
    StatusCode::Ok,
    StatusCode::Accepted,
    StatusCode::BadRequest,
    StatusCode::Unauthorized,
    StatusCode::Forbidden,
    StatusCode::NotFound,
    StatusCode::ProxyAuthenticationRequired,
    StatusCode::RequestTimeout,
    StatusCode::TemporarilyUnavailable,
    StatusCode::CallOrTransactionDoesNotExist,
    StatusCode::BusyHere,
    StatusCode::RequestTerminated,
    StatusCode::NotAcceptableHere,
    StatusCode::ServerInternalError,
    StatusCode::ServiceUnavailable,
    StatusCode::Decline,
];

impl StatusCode {
    /// Creates a status code from its numeric value
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStatusCode`] for values outside the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsphone_sip_core::StatusCode;
    ///
    /// assert_eq!(StatusCode::from_u16(200).unwrap(), StatusCode::Ok);
    /// assert!(StatusCode::from_u16(299).is_err());
    /// ```
    pub fn from_u16(code: u16) -> Result<Self> {
        ALL_STATUS_CODES
            .iter()
            .copied()
            .find(|status| status.as_u16() == code)
            .ok_or(Error::UnknownStatusCode(code))
    }

    /// Returns the numeric value of this status code
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Returns the canonical reason phrase for this status code
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Trying => "Trying",
            StatusCode::Ringing => "Ringing",
            StatusCode::CallIsBeingForwarded => "Call Is Being Forwarded",
            StatusCode::Queued => "Queued",
            StatusCode::SessionProgress => "Session Progress",

            StatusCode::Ok => "OK",
            StatusCode::Accepted => "Accepted",

            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::ProxyAuthenticationRequired => "Proxy Authentication Required",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::TemporarilyUnavailable => "Temporarily Unavailable",
            StatusCode::CallOrTransactionDoesNotExist => "Call/Transaction Does Not Exist",
            StatusCode::BusyHere => "Busy Here",
            StatusCode::RequestTerminated => "Request Terminated",
            StatusCode::NotAcceptableHere => "Not Acceptable Here",

            StatusCode::ServerInternalError => "Server Internal Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",

            StatusCode::Decline => "Decline",
        }
    }

    /// Returns the full status line, e.g. `SIP/2.0 180 Ringing`
    pub fn status_line(&self) -> String {
        format!("{} {} {}", SIP_VERSION, self.as_u16(), self.reason_phrase())
    }

    /// Returns true if this status code is provisional (1xx)
    pub fn is_provisional(&self) -> bool {
        let code = self.as_u16();
        code >= 100 && code < 200
    }

    /// Returns true if this status code is success (2xx)
    pub fn is_success(&self) -> bool {
        let code = self.as_u16();
        code >= 200 && code < 300
    }

    /// Returns true if this status code is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        let code = self.as_u16();
        code >= 400 && code < 500
    }

    /// Returns true if this status code indicates an error (4xx, 5xx, 6xx)
    pub fn is_error(&self) -> bool {
        let code = self.as_u16();
        code >= 400 && code < 700
    }

    /// Returns true for the two authentication challenge codes (401, 407)
    pub fn is_auth_challenge(&self) -> bool {
        matches!(self, StatusCode::Unauthorized | StatusCode::ProxyAuthenticationRequired)
    }
}

impl fmt::Display for StatusCode {
    /// Formats the status code as "<numeric code> <reason phrase>"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

impl FromStr for StatusCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::InvalidStatusLine(s.to_string()))?;
        StatusCode::from_u16(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_for_every_code() {
        for status in ALL_STATUS_CODES {
            let expected = format!("SIP/2.0 {} {}", status.as_u16(), status.reason_phrase());
            assert_eq!(status.status_line(), expected);
        }
        assert_eq!(StatusCode::Trying.status_line(), "SIP/2.0 100 Trying");
        assert_eq!(StatusCode::Ringing.status_line(), "SIP/2.0 180 Ringing");
        assert_eq!(StatusCode::Ok.status_line(), "SIP/2.0 200 OK");
    }

    #[test]
    fn test_from_u16_round_trips_table() {
        for status in ALL_STATUS_CODES {
            assert_eq!(StatusCode::from_u16(status.as_u16()).unwrap(), *status);
        }
        assert_eq!(StatusCode::from_u16(299), Err(Error::UnknownStatusCode(299)));
    }

    #[test]
    fn test_classification() {
        assert!(StatusCode::SessionProgress.is_provisional());
        assert!(!StatusCode::Ok.is_provisional());
        assert!(StatusCode::Accepted.is_success());
        assert!(StatusCode::Decline.is_error());
        assert!(StatusCode::Unauthorized.is_auth_challenge());
        assert!(StatusCode::ProxyAuthenticationRequired.is_auth_challenge());
        assert!(!StatusCode::Forbidden.is_auth_challenge());
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(matches!(StatusCode::from_str("abc"), Err(Error::InvalidStatusLine(_))));
    }
}
