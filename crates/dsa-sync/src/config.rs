//! Store and reconciler configuration.

/// Default database: a private in-memory SQLite database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
/// Name of the group characters are put in when nothing better is known.
pub const DEFAULT_GROUP_NAME: &str = "Meine Gruppe";

/// Configuration for [`Store`](crate::Store) and the import operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// SQLite connection URL, e.g. `sqlite://heroes.db`.
    pub database_url: String,
    /// Pool size; in-memory databases always use a single connection.
    pub max_connections: u32,
    /// Whether an import may create a character that does not exist locally.
    pub allow_create_new: bool,
    /// Group assigned to imported characters whose snapshot names none.
    pub default_group_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
            allow_create_new: true,
            default_group_name: DEFAULT_GROUP_NAME.to_string(),
        }
    }
}

impl SyncConfig {
    /// Configuration with defaults overridden from `DSA_DATABASE_URL`,
    /// `DSA_ALLOW_CREATE_NEW` and `DSA_DEFAULT_GROUP`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("DSA_DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(flag) = std::env::var("DSA_ALLOW_CREATE_NEW") {
            config.allow_create_new = !matches!(flag.trim(), "0" | "false" | "no" | "off");
        }
        if let Some(name) = std::env::var("DSA_DEFAULT_GROUP")
            .ok()
            .filter(|n| !n.trim().is_empty())
        {
            config.default_group_name = name;
        }
        config
    }

    /// Use a file-backed database at `path`, created if missing.
    pub fn with_database_path(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.database_url = format!("sqlite://{}", path.as_ref().display());
        self
    }

    /// Set the connection URL.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Set the pool size (at least 1).
    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    /// Allow or forbid creating characters on import.
    pub fn with_allow_create_new(mut self, allow: bool) -> Self {
        self.allow_create_new = allow;
        self
    }

    /// Set the fallback group name.
    pub fn with_default_group_name(mut self, name: impl Into<String>) -> Self {
        self.default_group_name = name.into();
        self
    }

    /// Whether the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Effective pool size.
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.allow_create_new);
        assert_eq!(config.default_group_name, "Meine Gruppe");
        assert!(config.is_in_memory());
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let config = SyncConfig::default().with_max_connections(8);
        assert_eq!(config.pool_size(), 1);
        let config = config.with_database_url("sqlite://heroes.db");
        assert_eq!(config.pool_size(), 8);
        assert_eq!(SyncConfig::default().with_max_connections(0).max_connections, 1);
    }

    #[test]
    fn database_path_becomes_url() {
        let config = SyncConfig::default().with_database_path("/tmp/heroes.db");
        assert_eq!(config.database_url, "sqlite:///tmp/heroes.db");
        assert!(!config.is_in_memory());
    }
}
