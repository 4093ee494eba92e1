//! Per-tick record of which cells hold an organism that has already acted.

/// Bitset over grid cell indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMarks {
    words: Vec<u64>,
    len: usize,
}

impl TickMarks {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unmark every cell
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    pub fn mark(&mut self, index: usize) {
        assert!(index < self.len, "mark index {index} out of range {}", self.len);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    pub fn is_marked(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Number of marked cells
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let mut marks = TickMarks::new(130);
        assert_eq!(marks.len(), 130);
        assert_eq!(marks.count(), 0);

        marks.mark(0);
        marks.mark(64);
        marks.mark(129);
        assert!(marks.is_marked(0));
        assert!(marks.is_marked(64));
        assert!(marks.is_marked(129));
        assert!(!marks.is_marked(1));
        assert_eq!(marks.count(), 3);

        marks.clear();
        assert_eq!(marks.count(), 0);
    }

    #[test]
    fn test_out_of_range_is_unmarked() {
        let marks = TickMarks::new(10);
        assert!(!marks.is_marked(10));
        assert!(!marks.is_marked(1000));
    }

    #[test]
    #[should_panic]
    fn test_mark_out_of_range_panics() {
        let mut marks = TickMarks::new(10);
        marks.mark(10);
    }
}
