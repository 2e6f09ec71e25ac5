//! Backend endpoint abstraction.

use std::fmt;

/// A single backend server, identified by host and port.
///
/// Immutable once built; the pool owns one per configured backend for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendEndpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl BackendEndpoint {
    /// Create a new backend endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Address tuple accepted by `TcpStream::connect`.
    pub fn connect_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_host_port() {
        let endpoint = BackendEndpoint::new("127.0.0.1", 8081);
        assert_eq!(endpoint.to_string(), "127.0.0.1:8081");
        assert_eq!(endpoint.connect_target(), ("127.0.0.1", 8081));
    }
}
