use std::path::PathBuf;

pub const DEFAULT_MOCK_SEED: u64 = 1337;

/// Feature toggles that alter how the service layer behaves. In mock mode
/// the world is ephemeral and seeded; nothing is written to disk unless
/// persistence is explicitly enabled.
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub mock_mode: bool,
    pub mock_data_path: Option<PathBuf>,
    pub persist_changes: bool,
    pub mock_seed: u64,
    pub mock_career_id: String,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            mock_mode: false,
            mock_data_path: None,
            persist_changes: true,
            mock_seed: DEFAULT_MOCK_SEED,
            mock_career_id: "c-mock".to_string(),
        }
    }
}

impl FeatureFlags {
    pub fn mock() -> Self {
        FeatureFlags {
            mock_mode: true,
            persist_changes: false,
            ..FeatureFlags::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parses the flag set from an environment-like lookup. Split out so
    /// tests can feed values without touching the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut flags = FeatureFlags::default();

        let features = get("MANAGER_FEATURES").unwrap_or_default();
        let tokens: Vec<String> = features
            .split(',')
            .map(|token| token.trim().to_ascii_lowercase())
            .filter(|token| !token.is_empty())
            .collect();

        let mock_mode = tokens.iter().any(|token| token == "mock")
            || get("MANAGER_MOCK_MODE").as_deref() == Some("1");
        if mock_mode {
            flags.mock_mode = true;
            flags.persist_changes = false;
        }

        if let Some(path) = get("MANAGER_MOCK_PATH").filter(|p| !p.is_empty()) {
            flags.mock_data_path = Some(PathBuf::from(path));
        }
        if let Some(seed) = get("MANAGER_MOCK_SEED") {
            if let Ok(seed) = seed.trim().parse::<u64>() {
                flags.mock_seed = seed;
            }
        }
        if get("MANAGER_PERSIST_CHANGES").as_deref() == Some("1") {
            flags.persist_changes = true;
        }
        if get("MANAGER_DISABLE_PERSIST").as_deref() == Some("1") {
            flags.persist_changes = false;
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_persist_without_mock() {
        let flags = FeatureFlags::from_lookup(|_| None);
        assert!(!flags.mock_mode);
        assert!(flags.persist_changes);
        assert_eq!(flags.mock_seed, DEFAULT_MOCK_SEED);
    }

    #[test]
    fn mock_token_disables_persistence() {
        let flags = FeatureFlags::from_lookup(lookup(&[
            ("MANAGER_FEATURES", "mock"),
            ("MANAGER_MOCK_SEED", "42"),
            ("MANAGER_MOCK_PATH", "/tmp/mock_state.json"),
        ]));
        assert!(flags.mock_mode);
        assert!(!flags.persist_changes);
        assert_eq!(flags.mock_seed, 42);
        assert_eq!(flags.mock_data_path, Some(PathBuf::from("/tmp/mock_state.json")));
    }

    #[test]
    fn persist_override_wins_in_mock_mode() {
        let flags = FeatureFlags::from_lookup(lookup(&[
            ("MANAGER_FEATURES", "mock"),
            ("MANAGER_PERSIST_CHANGES", "1"),
        ]));
        assert!(flags.mock_mode);
        assert!(flags.persist_changes);
    }

    #[test]
    fn disable_persist_beats_everything() {
        let flags = FeatureFlags::from_lookup(lookup(&[
            ("MANAGER_PERSIST_CHANGES", "1"),
            ("MANAGER_DISABLE_PERSIST", "1"),
        ]));
        assert!(!flags.persist_changes);
    }

    #[test]
    fn mock_mode_env_flag_alone_works() {
        let flags = FeatureFlags::from_lookup(lookup(&[("MANAGER_MOCK_MODE", "1")]));
        assert!(flags.mock_mode);
    }
}
