//! Character cursor over a channel string

use crate::error::{Error, Result};

/// Index-based cursor with one-character lookahead and retreat
#[derive(Debug, Clone)]
pub struct TextCursor {
    chars: Vec<char>,
    pos: usize,
}

impl TextCursor {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// Position of the next character to be read
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Read the next character and move past it
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Step back over the previously read character
    pub fn retreat(&mut self) -> Result<()> {
        if self.pos == 0 {
            return Err(Error::CursorUnderflow);
        }
        self.pos -= 1;
        Ok(())
    }

    /// Consume the next character only if it equals `target`
    pub fn read_if(&mut self, target: char) -> Result<bool> {
        match self.advance() {
            Some(c) if c == target => Ok(true),
            Some(_) => {
                self.retreat()?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Read up to `limit` consecutive ASCII digits.
    ///
    /// Returns `None` when no digit follows the cursor.
    pub fn read_digits(&mut self, limit: usize) -> Option<u32> {
        let mut value: Option<u32> = None;
        let mut count = 0;
        while count < limit {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) else {
                break;
            };
            self.pos += 1;
            count += 1;
            value = Some(value.unwrap_or(0) * 10 + digit);
        }
        value
    }
}
