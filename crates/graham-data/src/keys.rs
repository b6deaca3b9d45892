//! API key rotation.
//!
//! A [`KeyRotation`] is owned by the HTTP client that uses it. Rotation state
//! lives in the policy object itself, never in a global.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Environment variable holding comma-separated Alpha Vantage keys.
pub const ALPHA_VANTAGE_KEYS_ENV: &str = "ALPHA_VANTAGE_API_KEYS";

/// How the next key is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    /// Cycle through keys in order
    #[default]
    RoundRobin,
    /// Pick a key uniformly at random on each rotation
    Random,
}

/// A set of API keys and the index of the one in use.
#[derive(Debug)]
pub struct KeyRotation {
    keys: Vec<String>,
    current: AtomicUsize,
    strategy: RotationStrategy,
}

impl KeyRotation {
    /// Create a rotation over `keys`. Blank keys are dropped and the rest trimmed.
    pub fn new<I, S>(keys: I, strategy: RotationStrategy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keys,
            current: AtomicUsize::new(0),
            strategy,
        }
    }

    /// A rotation with a single key.
    pub fn single(key: impl AsRef<str>) -> Self {
        Self::new([key], RotationStrategy::RoundRobin)
    }

    /// Parse a comma-separated key list.
    pub fn from_csv(list: &str, strategy: RotationStrategy) -> Self {
        Self::new(list.split(','), strategy)
    }

    /// Keys from [`ALPHA_VANTAGE_KEYS_ENV`], or an empty rotation if unset.
    pub fn from_env(strategy: RotationStrategy) -> Self {
        std::env::var(ALPHA_VANTAGE_KEYS_ENV)
            .map(|list| Self::from_csv(&list, strategy))
            .unwrap_or_else(|_| Self::new(Vec::<String>::new(), strategy))
    }

    /// Number of usable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no key is configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The key currently in use.
    pub fn current(&self) -> Option<&str> {
        let index = self.current.load(Ordering::Relaxed);
        self.keys.get(index).map(String::as_str)
    }

    /// Move to another key. A single key never rotates.
    pub fn rotate(&self) -> Option<&str> {
        if self.keys.len() > 1 {
            let next = match self.strategy {
                RotationStrategy::RoundRobin => {
                    (self.current.load(Ordering::Relaxed) + 1) % self.keys.len()
                }
                RotationStrategy::Random => rand::thread_rng().gen_range(0..self.keys.len()),
            };
            self.current.store(next, Ordering::Relaxed);
        }
        self.current()
    }
}

/// Last four characters of a key, for log lines.
pub fn key_suffix(key: &str) -> &str {
    let start = key.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
    &key[start..]
}
