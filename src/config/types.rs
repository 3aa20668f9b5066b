//! Server settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// PostgreSQL URL. `None` runs on the in-process store.
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
    pub max_body_bytes: usize,
    pub max_per_page: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3001,
            db_max_connections: 5,
            request_timeout: Duration::from_secs(30),
            max_concurrent_requests: 256,
            max_body_bytes: 64 * 1024,
            max_per_page: 1000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
