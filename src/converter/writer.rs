//! Token sequence to channel text

use super::token::Token;
use crate::error::{Error, Result};
use std::fmt::Write;

/// Serialize a normalized token sequence
pub fn write_channel(tokens: &[Token]) -> Result<String> {
    let mut out = String::new();
    for token in tokens {
        // Writing to a String cannot fail
        let _ = match token {
            Token::Tempo { value } => write!(out, "t{}", value),
            Token::DefaultLength { value, dot } => {
                write!(out, "l{}{}", value, if *dot { "." } else { "" })
            }
            Token::Volume { value } => write!(out, "v{}", value),
            Token::Sustain { value } => write!(out, "s{}", value),
            Token::Octave { value } => write!(out, "o{}", value),
            Token::OctaveShift { up } => write!(out, "{}", if *up { '>' } else { '<' }),
            Token::Tie => write!(out, "&"),
            Token::Note(note) => write!(out, "{}", note),
            Token::AbsoluteNote { .. } => {
                return Err(Error::UnexpectedToken(format!(
                    "{} should have been converted to a relative note",
                    token.kind()
                )))
            }
        };
    }
    Ok(out)
}
