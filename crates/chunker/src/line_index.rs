/// Maps byte offsets into a file to 1-based line numbers.
///
/// Built once per file from the normalized line list; offsets account for the
/// single `\n` separator between lines.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
    total_length: usize,
}

impl LineIndex {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut offsets = Vec::with_capacity(lines.len());
        let mut position = 0usize;
        for (index, line) in lines.iter().enumerate() {
            offsets.push(position);
            position += line.as_ref().len();
            if index + 1 < lines.len() {
                position += 1;
            }
        }
        Self {
            offsets,
            total_length: position,
        }
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// 1-based line containing the byte offset, clamped to `[1, line_count]`.
    pub fn line_for_offset(&self, offset: usize) -> usize {
        if self.offsets.is_empty() {
            return 1;
        }
        if offset >= self.total_length {
            return self.offsets.len();
        }
        // partition_point yields the first line starting after `offset`.
        let position = self.offsets.partition_point(|&start| start <= offset);
        position.max(1)
    }

    /// Inclusive line range for a byte span with an exclusive end.
    pub fn range_for_span(&self, start: usize, end: usize) -> (usize, usize) {
        let inclusive_end = end.saturating_sub(1).max(start);
        (self.line_for_offset(start), self.line_for_offset(inclusive_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> LineIndex {
        // "ab\ncde\n\nf" -> offsets 0, 3, 7, 8
        LineIndex::new(&["ab", "cde", "", "f"])
    }

    #[test]
    fn offsets_are_strictly_increasing() {
        let index = index();
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.total_length(), 9);
    }

    #[test]
    fn maps_offsets_to_lines() {
        let index = index();
        assert_eq!(index.line_for_offset(0), 1);
        assert_eq!(index.line_for_offset(1), 1);
        assert_eq!(index.line_for_offset(2), 1); // the newline after "ab"
        assert_eq!(index.line_for_offset(3), 2);
        assert_eq!(index.line_for_offset(7), 3);
        assert_eq!(index.line_for_offset(8), 4);
    }

    #[test]
    fn clamps_past_the_end() {
        let index = index();
        assert_eq!(index.line_for_offset(9), 4);
        assert_eq!(index.line_for_offset(1000), 4);
    }

    #[test]
    fn empty_file_maps_to_line_one() {
        let index = LineIndex::new::<&str>(&[]);
        assert_eq!(index.line_for_offset(0), 1);
        assert_eq!(index.line_for_offset(42), 1);
    }

    #[test]
    fn span_end_is_exclusive() {
        let index = index();
        assert_eq!(index.range_for_span(0, 3), (1, 1));
        assert_eq!(index.range_for_span(0, 4), (1, 2));
        assert_eq!(index.range_for_span(3, 9), (2, 4));
        // Zero-width span still produces a valid single-line range.
        assert_eq!(index.range_for_span(3, 3), (2, 2));
    }
}
