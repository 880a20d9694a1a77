use std::collections::VecDeque;
use std::fmt;

/// Entries kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub input: String,
    pub result: String,
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.input, self.result)
    }
}

/// Bounded log of successful evaluations, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, input: impl Into<String>, result: impl Into<String>) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(HistoryRecord {
            input: input.into(),
            result: result.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    /// Entries rendered as `<input> → <result>`.
    pub fn formatted(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut log = HistoryLog::new();
        for i in 1..=11 {
            log.record(format!("{i}"), format!("Result: {i}"));
        }
        assert_eq!(log.len(), HISTORY_CAPACITY);
        let inputs: Vec<&str> = log.entries().map(|r| r.input.as_str()).collect();
        let expected: Vec<String> = (2..=11).map(|i| i.to_string()).collect();
        assert_eq!(inputs, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn entries_render_with_an_arrow() {
        let mut log = HistoryLog::with_capacity(2);
        log.record("2+2", "Result: 4");
        assert_eq!(log.formatted(), vec!["2+2 → Result: 4".to_string()]);
    }

    #[test]
    fn zero_capacity_keeps_the_latest_entry() {
        let mut log = HistoryLog::with_capacity(0);
        assert_eq!(log.capacity(), 1);
        log.record("a", "1");
        log.record("b", "2");
        assert_eq!(log.formatted(), vec!["b → 2".to_string()]);
    }
}
