use std::collections::{HashMap, HashSet};

/// Unique-client counts keyed by aggregation key. Iteration order is that of
/// `HashMap` and is not stable between runs.
pub type Snapshot = HashMap<String, usize>;

/// Distinct client identifiers seen per aggregation key.
#[derive(Debug, Default, Clone)]
pub struct UniqueAggregator {
    visitors: HashMap<String, HashSet<String>>,
}

impl UniqueAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `client_id` under `key`. Returns `true` if the pair is new.
    pub fn insert(&mut self, key: &str, client_id: &str) -> bool {
        match self.visitors.get_mut(key) {
            Some(clients) => {
                if clients.contains(client_id) {
                    return false;
                }
                clients.insert(client_id.to_string())
            }
            None => {
                let clients = HashSet::from([client_id.to_string()]);
                self.visitors.insert(key.to_string(), clients);
                true
            }
        }
    }

    /// Folds another aggregator's sets into this one.
    pub fn merge(&mut self, other: UniqueAggregator) {
        for (key, clients) in other.visitors {
            match self.visitors.get_mut(&key) {
                Some(existing) => existing.extend(clients),
                None => {
                    self.visitors.insert(key, clients);
                }
            }
        }
    }

    pub fn unique_count(&self, key: &str) -> usize {
        self.visitors.get(key).map_or(0, HashSet::len)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.visitors
            .iter()
            .map(|(key, clients)| (key.clone(), clients.len()))
            .collect()
    }
}
