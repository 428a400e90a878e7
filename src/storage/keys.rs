/// Key names used in the local store, all sharing one namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub user_data: String,
    pub refresh_token: String,
    pub last_login: String,
    pub settings: String,
    pub cache_prefix: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            token: format!("{namespace}_token"),
            user_data: format!("{namespace}_user_data"),
            refresh_token: format!("{namespace}_refresh_token"),
            last_login: format!("{namespace}_last_login"),
            settings: format!("{namespace}_settings"),
            cache_prefix: format!("{namespace}_cache"),
        }
    }

    /// Keys that make up the session mirror. Cleared together on sign-out.
    pub fn session_keys(&self) -> [&str; 4] {
        [
            &self.token,
            &self.user_data,
            &self.refresh_token,
            &self.last_login,
        ]
    }

    /// Every fixed key, including settings. Cache entries are not listed.
    pub fn all(&self) -> [&str; 5] {
        [
            &self.token,
            &self.user_data,
            &self.refresh_token,
            &self.last_login,
            &self.settings,
        ]
    }

    pub fn cache_key(&self, key: &str) -> String {
        format!("{}_{key}", self.cache_prefix)
    }

    pub fn is_cache_key(&self, key: &str) -> bool {
        key.starts_with(&self.cache_prefix)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("food_explorer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = StorageKeys::default();
        assert_eq!(keys.token, "food_explorer_token");
        assert_eq!(keys.user_data, "food_explorer_user_data");
        assert_eq!(keys.refresh_token, "food_explorer_refresh_token");
        assert_eq!(keys.last_login, "food_explorer_last_login");
        assert_eq!(keys.settings, "food_explorer_settings");
        assert_eq!(keys.cache_key("dishes"), "food_explorer_cache_dishes");
    }

    #[test]
    fn test_session_keys_exclude_settings() {
        let keys = StorageKeys::default();
        assert!(!keys.session_keys().contains(&keys.settings.as_str()));
        assert!(keys.all().contains(&keys.settings.as_str()));
    }

    #[test]
    fn test_cache_key_detection() {
        let keys = StorageKeys::new("app");
        assert!(keys.is_cache_key(&keys.cache_key("categories")));
        assert!(!keys.is_cache_key(&keys.token));
    }
}
