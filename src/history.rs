// history.rs
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10;

/// ISO codes of the most recent round targets, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn contains(&self, iso_code: &str) -> bool {
        self.entries.iter().any(|e| e.eq_ignore_ascii_case(iso_code))
    }

    /// Records a target. A code that is already present moves to the newest
    /// position; otherwise the oldest entry is evicted once over capacity.
    pub fn insert(&mut self, iso_code: &str) {
        self.entries.retain(|e| !e.eq_ignore_ascii_case(iso_code));
        self.entries.push_back(iso_code.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut history = RecentHistory::default();
        for i in 0..11 {
            history.insert(&format!("C{}", i));
        }
        assert_eq!(history.len(), 10);
        assert!(!history.contains("C0"));
        assert!(history.contains("C1"));
        assert_eq!(history.iter().next(), Some("C1"));
    }

    #[test]
    fn reinsertion_does_not_duplicate() {
        let mut history = RecentHistory::new(3);
        history.insert("FR");
        history.insert("DE");
        history.insert("FR");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["DE", "FR"]);
    }
}
