use super::Cue;

/// Default number of cues per translation request
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// A contiguous batch of cues sent as one translation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of this chunk in the chunk sequence
    pub position: usize,
    pub cues: &'a [Cue],
}

impl<'a> Chunk<'a> {
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue texts joined with the separator, as sent to the endpoint
    pub fn payload_text(&self, separator: &str) -> String {
        self.cues
            .iter()
            .map(|cue| cue.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Split cues into batches of at most `size`, boundaries at multiples of
/// `size`. A size of 0 is treated as 1.
pub fn chunk_cues(cues: &[Cue], size: usize) -> Vec<Chunk<'_>> {
    cues.chunks(size.max(1))
        .enumerate()
        .map(|(position, cues)| Chunk { position, cues })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues(n: u64) -> Vec<Cue> {
        (1..=n)
            .map(|i| Cue::new(i, format!("00:00:{:02},000 --> 00:00:{:02},500", i, i), format!("line {}", i)))
            .collect()
    }

    #[test]
    fn test_flatten_reproduces_input() {
        let source = cues(23);
        for size in 1..=25 {
            let chunks = chunk_cues(&source, size);
            let flat: Vec<Cue> = chunks.iter().flat_map(|c| c.cues.iter().cloned()).collect();
            assert_eq!(flat, source, "size {}", size);
            assert!(chunks.iter().all(|c| c.len() <= size && !c.is_empty()));
        }
    }

    #[test]
    fn test_boundaries_and_short_tail() {
        let source = cues(12);
        let chunks = chunk_cues(&source, DEFAULT_CHUNK_SIZE);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        assert_eq!(chunks[1].cues[0].index, 6);
        assert_eq!(chunks[2].position, 2);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(chunk_cues(&[], 5).is_empty());
    }

    #[test]
    fn test_zero_size_behaves_as_one() {
        assert_eq!(chunk_cues(&cues(3), 0).len(), 3);
    }

    #[test]
    fn test_payload_text_joins_with_separator() {
        let source = cues(2);
        let chunks = chunk_cues(&source, 5);
        assert_eq!(chunks[0].payload_text("\n\n"), "line 1\n\nline 2");
    }
}
