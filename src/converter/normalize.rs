//! Token rewrites applied to each channel before timing

use super::token::{Note, Pitch, Postfix, Token};
use crate::error::{Error, Result};

/// Octave in effect at the start of every channel
pub const INITIAL_OCTAVE: i32 = 4;

/// Octaves an `o` command can express with its single digit
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = 0..=9;

/// Semitone index (0 = C) to pitch letter and accidental
const CHROMATIC: [(Pitch, Postfix); 12] = [
    (Pitch::C, Postfix::Natural),
    (Pitch::C, Postfix::Sharp),
    (Pitch::D, Postfix::Natural),
    (Pitch::D, Postfix::Sharp),
    (Pitch::E, Postfix::Natural),
    (Pitch::F, Postfix::Natural),
    (Pitch::F, Postfix::Sharp),
    (Pitch::G, Postfix::Natural),
    (Pitch::G, Postfix::Sharp),
    (Pitch::A, Postfix::Natural),
    (Pitch::A, Postfix::Sharp),
    (Pitch::B, Postfix::Natural),
];

/// Replace every absolute note with relative notes.
///
/// An absolute note outside the current octave is wrapped in a pair of
/// octave commands so that the ambient octave is unchanged afterwards.
/// Fails when the octave to restore has been shifted outside `0..=9`.
pub fn expand_absolute_notes(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut octave = INITIAL_OCTAVE;
    let mut output = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.into_iter().enumerate() {
        match token {
            Token::Octave { value } => {
                octave = value;
                output.push(token);
            }
            Token::OctaveShift { up } => {
                octave += if up { 1 } else { -1 };
                output.push(token);
            }
            Token::AbsoluteNote { value } => {
                output.extend(absolute_to_relative(value, octave, index)?);
            }
            _ => output.push(token),
        }
    }

    Ok(output)
}

/// Expand one absolute note at the given ambient octave
fn absolute_to_relative(value: u32, octave: i32, index: usize) -> Result<Vec<Token>> {
    let note_octave = (value / 12) as i32;
    let (pitch, postfix) = CHROMATIC[(value % 12) as usize];
    let note = Token::Note(Note::new(pitch, postfix));

    if note_octave == octave {
        return Ok(vec![note]);
    }
    if !OCTAVE_RANGE.contains(&octave) {
        return Err(Error::OctaveOutOfRange { octave, index });
    }
    Ok(vec![
        Token::Octave { value: note_octave },
        note,
        Token::Octave { value: octave },
    ])
}

/// Move the dot of each default length command onto the notes that use it
pub fn propagate_default_dots(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut pending_dot = false;
    let mut output = Vec::with_capacity(tokens.len());

    for (index, mut token) in tokens.into_iter().enumerate() {
        match &mut token {
            Token::DefaultLength { dot, .. } => {
                pending_dot = *dot;
                *dot = false;
            }
            Token::Note(note) if pending_dot && note.length.is_none() => {
                if note.dot {
                    return Err(Error::DottedDefaultConflict { index });
                }
                note.dot = true;
            }
            _ => {}
        }
        output.push(token);
    }

    Ok(output)
}
