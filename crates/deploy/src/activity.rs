use std::collections::VecDeque;

/// Bounded activity log, newest line first.
///
/// When full, each push evicts the oldest line.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    /// Creates an empty log. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_back();
        }
        self.lines.push_front(line.into());
    }

    /// Iterate from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The most recently pushed line, if any.
    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Copy of the lines, newest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut log = ActivityLog::new(5);
        log.push("one");
        log.push("two");
        log.push("three");
        assert_eq!(log.iter().collect::<Vec<_>>(), vec!["three", "two", "one"]);
        assert_eq!(log.latest(), Some("three"));
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut log = ActivityLog::new(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.to_vec(), vec!["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn never_exceeds_two_hundred() {
        let mut log = ActivityLog::new(200);
        for i in 0..450 {
            log.push(format!("{i}"));
        }
        assert_eq!(log.len(), 200);
        assert_eq!(log.latest(), Some("449"));
        assert_eq!(log.iter().last(), Some("250"));
    }

    #[test]
    fn zero_capacity_keeps_one_line() {
        let mut log = ActivityLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.to_vec(), vec!["b"]);
    }

    #[test]
    fn clear_empties() {
        let mut log = ActivityLog::new(4);
        log.push("x");
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.latest(), None);
    }
}
