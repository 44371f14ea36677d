use log::warn;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_FILTER: &str = "streamflix=debug,actix_web=info";
const COOKIE_KEY_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub cookie_key: Vec<u8>,
    pub bcrypt_cost: u32,
    pub templates: String,
    /// How long the registration success message stays before the modal closes.
    pub success_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: DEFAULT_BIND.to_owned(),
            cookie_key: vec![0u8; COOKIE_KEY_LEN],
            bcrypt_cost: bcrypt::DEFAULT_COST,
            templates: concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*").to_owned(),
            success_delay: Duration::from_millis(900),
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(bind) = lookup("STREAMFLIX_BIND") {
            config.bind = bind;
        }
        match lookup("STREAMFLIX_COOKIE_KEY") {
            Some(key) if key.len() >= COOKIE_KEY_LEN => config.cookie_key = key.into_bytes(),
            Some(_) => warn!(
                "STREAMFLIX_COOKIE_KEY shorter than {} bytes, using the default key",
                COOKIE_KEY_LEN
            ),
            None => warn!("STREAMFLIX_COOKIE_KEY not set, using the default key"),
        }
        if let Some(cost) = lookup("STREAMFLIX_BCRYPT_COST") {
            match cost.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => config.bcrypt_cost = cost,
                _ => warn!("Ignoring invalid STREAMFLIX_BCRYPT_COST: {}", cost),
            }
        }
        if let Some(templates) = lookup("STREAMFLIX_TEMPLATES") {
            config.templates = templates;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.cookie_key, vec![0u8; 32]);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.templates.ends_with("/templates/**/*"));
        assert_eq!(config.success_delay, Duration::from_millis(900));
    }

    #[test]
    fn overrides() {
        let key = "k".repeat(40);
        let config = from_pairs(&[
            ("STREAMFLIX_BIND", "0.0.0.0:9000"),
            ("STREAMFLIX_COOKIE_KEY", key.as_str()),
            ("STREAMFLIX_BCRYPT_COST", "4"),
        ]);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.cookie_key, key.into_bytes());
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn rejects_weak_values() {
        let config = from_pairs(&[
            ("STREAMFLIX_COOKIE_KEY", "corta"),
            ("STREAMFLIX_BCRYPT_COST", "99"),
        ]);
        assert_eq!(config.cookie_key, vec![0u8; 32]);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }
}
