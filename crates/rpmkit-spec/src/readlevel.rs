//! `ReadLevel`: the conditional-gating frame stack from spec.md §3/§4.D,
//! grounded on `build/read.c`'s `spec->readStack` linked list of
//! `{ reading, next }` entries.

use crate::error::SpecError;

/// One `%if*`/`%else` nesting frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    reading: bool,
}

/// Stack of conditional frames; the top frame's `reading` gates whether
/// the current line is consumed.
#[derive(Debug, Clone)]
pub struct ReadLevel {
    frames: Vec<Frame>,
}

impl Default for ReadLevel {
    fn default() -> Self {
        Self { frames: vec![Frame { reading: true }] }
    }
}

impl ReadLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the current top frame says lines should be consumed.
    pub fn is_reading(&self) -> bool {
        self.frames.last().map(|f| f.reading).unwrap_or(true)
    }

    /// Pushes a new frame for an `%if*` directive; `matched` is whether
    /// the directive's own condition was true.
    pub fn push_if(&mut self, matched: bool) {
        let reading = self.is_reading() && matched;
        self.frames.push(Frame { reading });
    }

    /// Handles `%else`: inverts the top frame relative to its parent.
    /// Fails if there is no enclosing `%if`.
    pub fn handle_else(&mut self, path: &str, line: usize) -> Result<(), SpecError> {
        if self.frames.len() < 2 {
            return Err(SpecError::UnmatchedIf { path: path.to_string(), line });
        }
        let parent_reading = self.frames[self.frames.len() - 2].reading;
        let top = self.frames.last_mut().unwrap();
        top.reading = parent_reading && !top.reading;
        Ok(())
    }

    /// Handles `%endif`: pops the top frame. Fails if there is no
    /// enclosing `%if`.
    pub fn handle_endif(&mut self, path: &str, line: usize) -> Result<(), SpecError> {
        if self.frames.len() < 2 {
            return Err(SpecError::UnmatchedIf { path: path.to_string(), line });
        }
        self.frames.pop();
        Ok(())
    }

    /// `true` if any `%if` remains unclosed (checked at EOF).
    pub fn has_unclosed_if(&self) -> bool {
        self.frames.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_starts_true() {
        assert!(ReadLevel::new().is_reading());
    }

    #[test]
    fn push_if_gates_on_match() {
        let mut rl = ReadLevel::new();
        rl.push_if(false);
        assert!(!rl.is_reading());
    }

    #[test]
    fn nested_if_cannot_escape_outer_false() {
        let mut rl = ReadLevel::new();
        rl.push_if(false);
        rl.push_if(true);
        assert!(!rl.is_reading());
    }

    #[test]
    fn else_inverts_within_true_parent() {
        let mut rl = ReadLevel::new();
        rl.push_if(false);
        rl.handle_else("x", 1).unwrap();
        assert!(rl.is_reading());
    }

    #[test]
    fn else_without_if_is_unmatched() {
        let mut rl = ReadLevel::new();
        assert!(rl.handle_else("x", 1).is_err());
    }

    #[test]
    fn endif_pops_frame() {
        let mut rl = ReadLevel::new();
        rl.push_if(false);
        rl.handle_endif("x", 1).unwrap();
        assert!(rl.is_reading());
        assert!(!rl.has_unclosed_if());
    }

    #[test]
    fn unclosed_if_is_detected_at_eof() {
        let mut rl = ReadLevel::new();
        rl.push_if(true);
        assert!(rl.has_unclosed_if());
    }
}
