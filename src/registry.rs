use crate::CompetitionConfig;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Override path for the competitions seed table. Lets operators add a
/// newly-observed competition without a code change.
const COMPETITIONS_ENV: &str = "MATCHDAY_COMPETITIONS";
const SEED_COMPETITIONS: &str = include_str!("../competitions.json");

#[derive(Debug)]
pub enum RegistryError {
    Read(std::io::Error, String),
    Parse(serde_json::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Read(e, path) => write!(f, "could not read {path}: {e}"),
            RegistryError::Parse(e) => write!(f, "invalid competitions json: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Per-competition timezone and day-boundary configuration, keyed by the
/// provider's competition id.
///
/// Lookups for unknown ids resolve to a UTC / 06:00 default rather than an
/// error — an unlisted competition should still render, just without its
/// home-zone day bucketing. Writes happen at startup or via an explicit
/// [`register`](Self::register); callers that register from concurrent
/// request handlers must wrap the registry in a lock.
#[derive(Debug, Clone, Default)]
pub struct CompetitionRegistry {
    competitions: HashMap<u32, CompetitionConfig>,
}

impl CompetitionRegistry {
    /// Load the registry from `MATCHDAY_COMPETITIONS` if set, otherwise from
    /// the embedded seed table. A broken override file is logged and ignored
    /// so a bad deploy never takes the schedule down.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(COMPETITIONS_ENV)
            && !path.trim().is_empty()
        {
            match Self::from_file(&path) {
                Ok(registry) => {
                    debug!("loaded {} competitions from {path}", registry.len());
                    return registry;
                }
                Err(e) => warn!("ignoring {COMPETITIONS_ENV}={path}: {e}; using embedded seed"),
            }
        }

        Self::from_json(SEED_COMPETITIONS).unwrap_or_else(|e| {
            warn!("embedded competitions seed failed to parse: {e}");
            Self::default()
        })
    }

    pub fn from_file(path: &str) -> RegistryResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RegistryError::Read(e, path.to_owned()))?;
        Self::from_json(&content)
    }

    /// Parse a JSON array of competition configs. Duplicate ids keep the
    /// last entry, matching [`register`](Self::register) overwrite semantics.
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let entries: Vec<CompetitionConfig> =
            serde_json::from_str(json).map_err(RegistryError::Parse)?;
        let mut registry = Self::default();
        for entry in entries {
            registry.register(entry);
        }
        Ok(registry)
    }

    /// Resolve a competition id to its config, or to the UTC / 06:00 default
    /// (with the requested id preserved for diagnostics) when unlisted.
    pub fn lookup(&self, id: u32) -> CompetitionConfig {
        self.competitions
            .get(&id)
            .cloned()
            .unwrap_or_else(|| CompetitionConfig { id, ..CompetitionConfig::default() })
    }

    /// Insert or replace a competition. Takes effect for subsequent lookups
    /// immediately; previously computed conversions are unaffected.
    pub fn register(&mut self, config: CompetitionConfig) {
        self.competitions.insert(config.id, config);
    }

    pub fn len(&self) -> usize {
        self.competitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitions.is_empty()
    }
}
