use thiserror::Error;

/// Column budget used when the caller does not pick one.
pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflowError {
    #[error("reflow width must be a positive number of columns (got {0})")]
    InvalidWidth(usize),
}

/// How runs of consecutive spaces inside an over-long line are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpacePolicy {
    /// Each empty word between adjacent spaces still contributes a separator,
    /// so interior runs survive inside a wrapped line.
    #[default]
    Preserve,
    /// Empty words are dropped and wrapped lines use single spaces.
    Collapse,
}

/// Greedy line re-wrapper that never splits a word.
///
/// Lines that already fit are returned byte-identical. Longer lines are split
/// on single spaces and packed word by word; a word wider than the budget
/// lands alone on its own line rather than being cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reflow {
    width: usize,
    spaces: SpacePolicy,
}

impl Reflow {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            spaces: SpacePolicy::default(),
        }
    }

    pub fn spaces(mut self, policy: SpacePolicy) -> Self {
        self.spaces = policy;
        self
    }

    pub fn apply(&self, text: &str) -> Result<String, ReflowError> {
        if self.width == 0 {
            return Err(ReflowError::InvalidWidth(self.width));
        }

        let mut lines: Vec<String> = Vec::new();
        for line in text.split('\n') {
            if column_len(line) <= self.width {
                lines.push(line.to_string());
            } else {
                self.wrap_line(line, &mut lines);
            }
        }

        Ok(lines.join("\n"))
    }

    fn wrap_line(&self, line: &str, out: &mut Vec<String>) {
        let emitted_before = out.len();
        let mut buffer = String::new();
        let mut buffer_len = 0usize;

        for word in line.split(' ') {
            if word.is_empty() && self.spaces == SpacePolicy::Collapse {
                continue;
            }

            let word_len = column_len(word);
            if buffer.is_empty() {
                buffer.push_str(word);
                buffer_len = word_len;
            } else if buffer_len + 1 + word_len > self.width {
                out.push(std::mem::take(&mut buffer));
                buffer.push_str(word);
                buffer_len = word_len;
            } else {
                buffer.push(' ');
                buffer.push_str(word);
                buffer_len += 1 + word_len;
            }
        }

        // An all-space line still has to occupy one output line.
        if !buffer.is_empty() || out.len() == emitted_before {
            out.push(buffer);
        }
    }
}

impl Default for Reflow {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

/// Re-wrap `text` so that no line exceeds `width` columns unless it is a
/// single unbreakable word. Only a zero width is rejected.
pub fn reflow(text: &str, width: usize) -> Result<String, ReflowError> {
    Reflow::new(width).apply(text)
}

fn column_len(s: &str) -> usize {
    s.chars().count()
}
