use std::net::SocketAddr;
use std::path::PathBuf;

/// Mock server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerConfig {
    /// TCP port for the gRPC server (default 50051). Env var: `GRPCMOCK_PORT`.
    pub port: u16,
    /// Root of the request/response fixture tree. Env var: `GRPCMOCK_STUBS_DIR`.
    /// When unset, only programmatically registered expectations are served.
    pub stubs_dir: Option<PathBuf>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            port: 50051,
            stubs_dir: None,
        }
    }
}

impl MockServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("GRPCMOCK_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            stubs_dir: lookup("GRPCMOCK_STUBS_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
