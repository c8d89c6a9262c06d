//! Seeded fault-injecting resolver.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use lipmaa_core::{KeyResolver, ResolveError};
use lipmaa_proto::{Entry, EntryKey, Signature};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-lookup fault probabilities, each in `[0, 1]`.
///
/// Faults are drawn in field order; at most one applies to a lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultConfig {
    /// Answer "not found" for a stored entry.
    pub drop_rate: f64,
    /// Return the entry with one signature bit flipped.
    pub corrupt_rate: f64,
    /// Return a different stored entry.
    pub substitute_rate: f64,
    /// Fail with a backend error.
    pub error_rate: f64,
}

impl FaultConfig {
    /// Well-behaved resolver.
    pub const fn none() -> Self {
        Self { drop_rate: 0.0, corrupt_rate: 0.0, substitute_rate: 0.0, error_rate: 0.0 }
    }

    /// Same probability for every fault kind.
    pub const fn uniform(rate: f64) -> Self {
        Self { drop_rate: rate, corrupt_rate: rate, substitute_rate: rate, error_rate: rate }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// A fault injected into one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Stored entry reported missing.
    Dropped {
        /// Requested key.
        key: EntryKey,
    },
    /// Entry returned with a damaged signature.
    Corrupted {
        /// Requested key.
        key: EntryKey,
    },
    /// Another entry returned in its place.
    Substituted {
        /// Requested key.
        key: EntryKey,
        /// Key of the entry actually returned.
        with: EntryKey,
    },
    /// Backend error returned.
    Failed {
        /// Requested key.
        key: EntryKey,
    },
}

#[derive(Debug)]
struct ChaosState {
    rng: ChaCha8Rng,
    injected: Vec<Fault>,
}

/// Key resolver over a fixed set of entries that injects seeded faults.
#[derive(Debug)]
pub struct ChaoticLog {
    entries: HashMap<EntryKey, Entry>,
    /// Keys in insertion order, for deterministic substitution.
    order: Vec<EntryKey>,
    config: FaultConfig,
    state: Mutex<ChaosState>,
}

impl ChaoticLog {
    /// Serve `entries` with faults drawn from `seed`.
    pub fn new(entries: impl IntoIterator<Item = Entry>, seed: u64, config: FaultConfig) -> Self {
        let mut map = HashMap::new();
        let mut order = Vec::new();
        for entry in entries {
            let key = entry.key;
            if map.insert(key, entry).is_none() {
                order.push(key);
            }
        }

        Self {
            entries: map,
            order,
            config,
            state: Mutex::new(ChaosState {
                rng: ChaCha8Rng::seed_from_u64(seed),
                injected: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChaosState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Faults injected so far, oldest first.
    pub fn faults(&self) -> Vec<Fault> {
        self.lock().injected.clone()
    }

    /// Faults injected since the last call.
    pub fn take_faults(&self) -> Vec<Fault> {
        std::mem::take(&mut self.lock().injected)
    }

    fn corrupt(entry: &mut Entry, bit: usize) {
        let mut bytes = *entry.metadata.signature.as_bytes();
        bytes[bit / 8 % Signature::LEN] ^= 1 << (bit % 8);
        entry.metadata.signature = Signature::from_bytes(bytes);
    }

    fn lookup(&self, key: &EntryKey) -> Result<Option<Entry>, ResolveError> {
        let Some(stored) = self.entries.get(key) else {
            return Ok(None);
        };

        let mut state = self.lock();
        let config = self.config;

        if state.rng.gen_bool(config.drop_rate) {
            state.injected.push(Fault::Dropped { key: *key });
            tracing::debug!("Dropping {}", key);
            return Ok(None);
        }

        if state.rng.gen_bool(config.corrupt_rate) {
            let bit = state.rng.gen_range(0..Signature::LEN * 8);
            let mut entry = stored.clone();
            Self::corrupt(&mut entry, bit);
            state.injected.push(Fault::Corrupted { key: *key });
            tracing::debug!("Corrupting {}", key);
            return Ok(Some(entry));
        }

        if self.order.len() > 1 && state.rng.gen_bool(config.substitute_rate) {
            let offset = state.rng.gen_range(1..self.order.len());
            let position = self.order.iter().position(|k| k == key).unwrap_or(0);
            let with = self.order[(position + offset) % self.order.len()];
            if let Some(other) = self.entries.get(&with) {
                state.injected.push(Fault::Substituted { key: *key, with });
                tracing::debug!("Substituting {} with {}", key, with);
                return Ok(Some(other.clone()));
            }
        }

        if state.rng.gen_bool(config.error_rate) {
            state.injected.push(Fault::Failed { key: *key });
            return Err(ResolveError::Unavailable(format!("injected failure for {key}")));
        }

        Ok(Some(stored.clone()))
    }
}

#[async_trait]
impl KeyResolver for ChaoticLog {
    async fn resolve_key(&self, key: &EntryKey) -> Result<Option<Entry>, ResolveError> {
        self.lookup(key)
    }
}
