use super::{Cue, TIMING_SEPARATOR};

/// Cue being accumulated while scanning
#[derive(Default)]
struct PendingCue {
    index: u64,
    time: String,
    text: String,
}

impl PendingCue {
    /// Index 0 never produces a cue. Subtitle files number cues from 1,
    /// so this only drops entries of malformed input.
    fn flush_into(self, cues: &mut Vec<Cue>) {
        if self.index != 0 {
            cues.push(Cue {
                index: self.index,
                time: self.time,
                text: self.text.trim().to_string(),
            });
        }
    }
}

/// Parse raw subtitle text into cues, in source order.
///
/// Best effort: a line holding a plain integer opens a new cue, a line
/// containing `-->` becomes the current cue's time range verbatim, and
/// every other non-empty line is appended to the current text with a single
/// space. Nothing in the input is treated as an error.
pub fn parse_subtitles(content: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut pending = PendingCue::default();

    for line in content.lines() {
        if let Some(index) = parse_index_line(line) {
            std::mem::take(&mut pending).flush_into(&mut cues);
            pending.index = index;
        } else if line.contains(TIMING_SEPARATOR) {
            pending.time = line.to_string();
        } else if !line.trim().is_empty() {
            if !pending.text.is_empty() {
                pending.text.push(' ');
            }
            pending.text.push_str(line);
        }
    }
    pending.flush_into(&mut cues);

    cues
}

fn parse_index_line(line: &str) -> Option<u64> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
