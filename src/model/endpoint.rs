//! Host endpoint identity.

use std::fmt;
use std::str::FromStr;

/// Port used when an endpoint is given without one.
pub const DEFAULT_PORT: u16 = 11211;

/// A `host:port` pair. Identity key for every per-host structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostEndpoint {
    pub host: String,
    pub port: u16,
}

impl HostEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name cut to `max` characters, with `...` appended when cut.
    pub fn display_name(&self, max: usize) -> String {
        if self.host.chars().count() > max {
            let head: String = self.host.chars().take(max).collect();
            format!("{}...", head)
        } else {
            self.host.clone()
        }
    }
}

impl fmt::Display for HostEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error returned when an endpoint string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointParseError {
    pub input: String,
}

impl fmt::Display for EndpointParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid endpoint '{}'", self.input)
    }
}

impl std::error::Error for EndpointParseError {}

impl FromStr for HostEndpoint {
    type Err = EndpointParseError;

    /// Parses `host:port` or a bare `host` (port defaults to 11211).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || EndpointParseError {
            input: s.to_string(),
        };
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().map_err(|_| err())?),
            None => (s, DEFAULT_PORT),
        };
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(err());
        }
        Ok(Self::new(host, port))
    }
}
