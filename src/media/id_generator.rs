use std::collections::{HashMap, VecDeque};

/// Number of keys an [`IdGenerator`] remembers by default
pub const DEFAULT_CAPACITY: usize = 10;

/// Per-key counters with bounded memory
///
/// Each key counts up from 1. Only the most recently *inserted* keys are
/// kept; once the capacity is exceeded the oldest key is forgotten and
/// starts over at 1 if it shows up again. Repeated use of a key does not
/// refresh its position.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    counters: HashMap<String, u64>,
    order: VecDeque<String>,
    capacity: usize,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a generator remembering at most `capacity` keys (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            counters: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the next number for `key`
    pub fn next(&mut self, key: &str) -> u64 {
        if let Some(counter) = self.counters.get_mut(key) {
            *counter += 1;
            return *counter;
        }

        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.counters.remove(&oldest);
            }
        }

        self.counters.insert(key.to_string(), 1);
        self.order.push_back(key.to_string());
        1
    }

    /// Number of keys currently remembered
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
