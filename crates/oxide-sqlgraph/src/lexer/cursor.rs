//! Character cursor shared by the lexer, the normalizer and the splitter.

/// A forward-only cursor over a string, tracking a byte offset.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The current byte offset.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor back to a previously observed offset.
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Returns the current character without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the character after the current one without advancing.
    #[must_use]
    pub fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advances while `pred` holds for the current character.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut pred) {
            self.advance();
        }
    }

    /// The text consumed since `start`.
    #[must_use]
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }
}
