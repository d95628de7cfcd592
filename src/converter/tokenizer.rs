//! Channel text to token sequence

use super::cursor::TextCursor;
use super::token::{Note, Pitch, Postfix, Token};
use crate::error::{Error, Result};

/// Digit limits per command
mod digits {
    pub const TEMPO: usize = 3;
    pub const DEFAULT_LENGTH: usize = 2;
    pub const VOLUME: usize = 2;
    pub const SUSTAIN: usize = 2;
    pub const OCTAVE: usize = 1;
    pub const ABSOLUTE_NOTE: usize = 2;
    pub const NOTE_LENGTH: usize = 2;
}

/// Parse one lowercase channel string into tokens
pub fn parse_channel(text: &str) -> Result<Vec<Token>> {
    let mut cursor = TextCursor::new(text);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.advance() {
        let token = match c {
            't' => Token::Tempo {
                value: read_number(&mut cursor, c, digits::TEMPO)?,
            },
            'l' => {
                let value = read_length(&mut cursor, c, digits::DEFAULT_LENGTH)?;
                let dot = cursor.read_if('.')?;
                Token::DefaultLength { value, dot }
            }
            'v' => Token::Volume {
                value: read_number(&mut cursor, c, digits::VOLUME)?,
            },
            's' => Token::Sustain {
                value: read_number(&mut cursor, c, digits::SUSTAIN)?,
            },
            'o' => Token::Octave {
                value: read_number(&mut cursor, c, digits::OCTAVE)? as i32,
            },
            'n' => Token::AbsoluteNote {
                value: read_number(&mut cursor, c, digits::ABSOLUTE_NOTE)?,
            },
            '<' => Token::OctaveShift { up: false },
            '>' => Token::OctaveShift { up: true },
            '&' => Token::Tie,
            _ => match Pitch::from_char(c) {
                Some(pitch) => Token::Note(read_note(&mut cursor, pitch)?),
                None => {
                    return Err(Error::UnexpectedChar {
                        character: c,
                        position: cursor.position() - 1,
                    })
                }
            },
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Read the accidental, length and dot following a pitch letter
fn read_note(cursor: &mut TextCursor, pitch: Pitch) -> Result<Note> {
    let mut postfix = Postfix::Natural;
    if !pitch.is_rest() {
        if cursor.read_if('+')? || cursor.read_if('#')? {
            postfix = Postfix::Sharp;
        } else if cursor.read_if('-')? {
            postfix = Postfix::Flat;
        }
    }

    let mut note = Note::new(pitch, postfix);
    let position = cursor.position();
    if let Some(length) = cursor.read_digits(digits::NOTE_LENGTH) {
        if length == 0 {
            return Err(Error::InvalidLength {
                value: length,
                position,
            });
        }
        note.length = Some(length);
    }
    note.dot = cursor.read_if('.')?;
    Ok(note)
}

/// Read a required numeric argument
fn read_number(cursor: &mut TextCursor, command: char, limit: usize) -> Result<u32> {
    cursor.read_digits(limit).ok_or(Error::MissingNumber {
        command,
        position: cursor.position(),
    })
}

/// Read a required length denominator, which must be non-zero
fn read_length(cursor: &mut TextCursor, command: char, limit: usize) -> Result<u32> {
    let position = cursor.position();
    let value = read_number(cursor, command, limit)?;
    if value == 0 {
        return Err(Error::InvalidLength { value, position });
    }
    Ok(value)
}
