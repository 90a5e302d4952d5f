use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub fn required_env(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("missing env: {name}"))
}

/// `None` when the variable is unset or blank, so an empty value in a
/// compose file behaves like "not configured".
pub fn optional_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

pub fn socket_addr_from_env(name: &str, default: &str) -> Result<SocketAddr> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    SocketAddr::from_str(&value).map_err(|err| anyhow!("invalid socket addr for {name}: {err}"))
}

pub fn u64_from_env(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvGuard {
        key: &'static str,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(self.key);
        }
    }

    fn set_env(key: &'static str, value: &str) -> EnvGuard {
        env::set_var(key, value);
        EnvGuard { key }
    }

    #[test]
    fn required_env_reads_value() {
        let _guard = set_env("PORTAL_TEST_REQUIRED_PRESENT", "value");
        assert_eq!(required_env("PORTAL_TEST_REQUIRED_PRESENT").unwrap(), "value");
    }

    #[test]
    fn required_env_missing_returns_error() {
        env::remove_var("PORTAL_TEST_REQUIRED_MISSING");
        assert!(required_env("PORTAL_TEST_REQUIRED_MISSING").is_err());
    }

    #[test]
    fn optional_env_treats_blank_as_unset() {
        let _guard = set_env("PORTAL_TEST_OPTIONAL_BLANK", "  ");
        assert_eq!(optional_env("PORTAL_TEST_OPTIONAL_BLANK"), None);
    }

    #[test]
    fn optional_env_reads_value() {
        let _guard = set_env("PORTAL_TEST_OPTIONAL_SET", "postgres://shadow");
        assert_eq!(
            optional_env("PORTAL_TEST_OPTIONAL_SET").as_deref(),
            Some("postgres://shadow")
        );
    }

    #[test]
    fn socket_addr_from_env_uses_default() {
        env::remove_var("PORTAL_TEST_SOCKET_DEFAULT");
        let addr = socket_addr_from_env("PORTAL_TEST_SOCKET_DEFAULT", "127.0.0.1:3000").unwrap();
        assert_eq!(addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn socket_addr_from_env_parses_override() {
        let _guard = set_env("PORTAL_TEST_SOCKET_OVERRIDE", "0.0.0.0:8088");
        let addr = socket_addr_from_env("PORTAL_TEST_SOCKET_OVERRIDE", "127.0.0.1:3000").unwrap();
        assert_eq!(addr, "0.0.0.0:8088".parse().unwrap());
    }

    #[test]
    fn socket_addr_from_env_invalid_returns_error() {
        let _guard = set_env("PORTAL_TEST_SOCKET_INVALID", "not-a-socket");
        assert!(socket_addr_from_env("PORTAL_TEST_SOCKET_INVALID", "127.0.0.1:3000").is_err());
    }

    #[test]
    fn u64_from_env_falls_back_on_garbage() {
        let _guard = set_env("PORTAL_TEST_U64_INVALID", "many");
        assert_eq!(u64_from_env("PORTAL_TEST_U64_INVALID", 30), 30);
    }
}
