//! Running per-key statistics.

use hashbrown::HashMap;

/// Running min/max/sum/count for one key.
///
/// Always holds at least one observation, so `min <= mean <= max` holds
/// from construction on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateState {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl AggregateState {
    /// State after observing a single value
    pub fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    /// Fold one more observation in
    #[inline]
    pub fn update(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    /// Combine with a state accumulated elsewhere for the same key
    #[inline]
    pub fn merge(&mut self, other: &AggregateState) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Mapping from key to its [`AggregateState`].
///
/// Owned by exactly one aggregator while it is being filled; handed out by
/// value once that aggregator has finished.
#[derive(Debug, Clone, Default)]
pub struct AggregateTable {
    entries: HashMap<String, AggregateState>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a value for an owned key, inserting a fresh state on first sight
    #[inline]
    pub fn fold(&mut self, key: String, value: f64) {
        self.entries
            .entry(key)
            .and_modify(|e| e.update(value))
            .or_insert_with(|| AggregateState::new(value));
    }

    /// Like [`fold`](Self::fold) but only allocates the key when it is new
    #[inline]
    pub fn fold_borrowed(&mut self, key: &str, value: f64) {
        match self.entries.get_mut(key) {
            Some(state) => state.update(value),
            None => {
                self.entries.insert(key.to_owned(), AggregateState::new(value));
            }
        }
    }

    /// Absorb another table, combining states of keys present in both
    pub fn merge(mut self, other: AggregateTable) -> AggregateTable {
        if self.entries.len() < other.entries.len() {
            return other.merge(self);
        }
        for (key, state) in other.entries {
            self.entries
                .entry(key)
                .and_modify(|e| e.merge(&state))
                .or_insert(state);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&AggregateState> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total observations across all keys
    pub fn observations(&self) -> u64 {
        self.entries.values().map(AggregateState::count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateState)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by key
    pub fn sorted(&self) -> Vec<(&str, &AggregateState)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
