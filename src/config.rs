//! Connection configuration.
use std::fmt;

/// Options for [`Session::connect`][crate::session::Session::connect].
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Keyspace to `USE` right after `READY`; empty means none.
    pub keyspace: String,
    /// Connect-retry count with at-least-one-attempt semantics.
    pub connect_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9042,
            user: String::new(),
            password: String::new(),
            keyspace: String::new(),
            connect_retries: 1,
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), ..Default::default() }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = keyspace.into();
        self
    }

    pub fn connect_retries(mut self, retries: u32) -> Self {
        self.connect_retries = retries.max(1);
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_retries_is_at_least_one() {
        let cfg = Config::new("localhost").connect_retries(0);
        assert_eq!(cfg.connect_retries, 1);
    }

    #[test]
    fn default_port_is_9042() {
        assert_eq!(Config::default().port, 9042);
    }
}
