//! Server configuration from the environment.

use std::net::{AddrParseError, SocketAddr};

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl ServerConfig {
    /// `INGEST_LISTEN` if set, else `0.0.0.0:$PORT` (PORT defaults to 5000).
    pub fn from_env() -> Result<Self, AddrParseError> {
        Self::resolve(
            std::env::var("INGEST_LISTEN").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn resolve(listen: Option<String>, port: Option<String>) -> Result<Self, AddrParseError> {
        let listen = match listen {
            Some(addr) => addr.parse()?,
            None => {
                let port = port
                    .and_then(|p| p.trim().parse::<u16>().ok())
                    .filter(|p| *p > 0)
                    .unwrap_or(DEFAULT_PORT);
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };
        Ok(Self { listen })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_wins_over_port() {
        let c = ServerConfig::resolve(Some("127.0.0.1:9000".into()), Some("7000".into())).unwrap();
        assert_eq!(c.listen, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn port_and_default() {
        let c = ServerConfig::resolve(None, Some("7000".into())).unwrap();
        assert_eq!(c.listen.port(), 7000);
        let c = ServerConfig::resolve(None, Some("not-a-port".into())).unwrap();
        assert_eq!(c.listen.port(), 5000);
        let c = ServerConfig::resolve(None, Some("0".into())).unwrap();
        assert_eq!(c.listen.port(), 5000);
        let c = ServerConfig::resolve(None, None).unwrap();
        assert_eq!(c.listen, "0.0.0.0:5000".parse().unwrap());
    }

    #[test]
    fn bad_listen_is_an_error() {
        assert!(ServerConfig::resolve(Some("nope".into()), None).is_err());
    }
}
