//! Proxy configuration resolved from defaults and environment variables.
//!
//! A [`ProxyConfig`] is resolved once, when a registry is built, and never
//! changes afterwards. Malformed environment values fall back to defaults.

// =============================================================================
// Repr Limits
// =============================================================================

/// Size limits for the abbreviated `repr` a proxy renders of its target.
///
/// Defaults follow `reprlib`, except `max_other`, which is 50.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReprLimits {
    /// Maximum container nesting depth.
    pub max_level: usize,
    /// Items shown for a tuple.
    pub max_tuple: usize,
    /// Items shown for a list.
    pub max_list: usize,
    /// Items shown for a set.
    pub max_set: usize,
    /// Entries shown for a dict.
    pub max_dict: usize,
    /// Characters shown for a string repr.
    pub max_string: usize,
    /// Characters shown for an integer repr.
    pub max_long: usize,
    /// Characters shown for any other object's repr.
    pub max_other: usize,
}

impl Default for ReprLimits {
    fn default() -> Self {
        Self {
            max_level: 6,
            max_tuple: 6,
            max_list: 6,
            max_set: 6,
            max_dict: 4,
            max_string: 30,
            max_long: 40,
            max_other: 50,
        }
    }
}

// =============================================================================
// Proxy Configuration
// =============================================================================

/// Configuration shared by a registry and every proxy it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Limits for proxy `repr`.
    pub repr: ReprLimits,

    /// Install the default immutable types and container proxies.
    pub builtins: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            repr: ReprLimits::default(),
            builtins: true,
        }
    }
}

impl ProxyConfig {
    /// Resolve configuration from defaults plus `FROST_*` environment variables.
    ///
    /// Nothing is read when `FROST_IGNORE_ENV` is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if Self::env_bool("FROST_IGNORE_ENV") {
            return config;
        }

        if let Some(level) = Self::env_usize("FROST_REPR_MAX_LEVEL") {
            config.repr.max_level = level;
        }
        if let Some(items) = Self::env_usize("FROST_REPR_MAX_ITEMS") {
            config.repr.max_tuple = items;
            config.repr.max_list = items;
            config.repr.max_set = items;
        }
        if let Some(chars) = Self::env_usize("FROST_REPR_MAX_STRING") {
            config.repr.max_string = chars;
        }
        if let Some(chars) = Self::env_usize("FROST_REPR_MAX_OTHER") {
            config.repr.max_other = chars;
        }
        config.builtins = !Self::env_bool("FROST_NO_BUILTINS");

        config
    }

    /// Config without the default registrations.
    pub fn without_builtins() -> Self {
        Self {
            builtins: false,
            ..Self::default()
        }
    }

    /// A variable counts as set when it is present and non-empty.
    fn env_bool(key: &str) -> bool {
        std::env::var(key).map(|v| !v.is_empty()).unwrap_or(false)
    }

    fn env_usize(key: &str) -> Option<usize> {
        std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_repr_limits() {
        let limits = ReprLimits::default();
        assert_eq!(limits.max_other, 50);
        assert_eq!(limits.max_dict, 4);
        assert_eq!(limits.max_level, 6);
    }

    #[test]
    fn test_default_config_installs_builtins() {
        assert!(ProxyConfig::default().builtins);
        assert!(!ProxyConfig::without_builtins().builtins);
    }

    #[test]
    fn test_env_bool_missing_is_false() {
        assert!(!ProxyConfig::env_bool("FROST_TEST_NONEXISTENT_80412"));
    }

    #[test]
    fn test_env_usize_missing_is_none() {
        assert_eq!(ProxyConfig::env_usize("FROST_TEST_NONEXISTENT_80413"), None);
    }
}
