//! Tick arithmetic and per-token time maps
//!
//! A whole note is 128 ticks, so a 64th note is 2 ticks and a dotted
//! 64th is 3. Lengths such as triplets are fractional and carried as `f64`.

use super::token::{Note, Token};
use crate::error::{Error, Result};

/// Ticks in a whole note
pub const WHOLE_NOTE_TICKS: u32 = 128;

/// Ticks in a quarter note, the length used before any `l` command
pub const QUARTER_NOTE_TICKS: f64 = 32.0;

/// Distance below which a tick value is treated as a whole number
pub const TICK_EPSILON: f64 = 1e-9;

/// Length in ticks of a note with denominator `length`
pub fn length_ticks(length: u32, dot: bool) -> f64 {
    let ticks = WHOLE_NOTE_TICKS as f64 / length as f64;
    if dot {
        ticks * 1.5
    } else {
        ticks
    }
}

/// Length in ticks of a note, given the default length in effect
pub fn note_ticks(note: &Note, default_length: f64) -> f64 {
    let ticks = match note.length {
        Some(length) => length_ticks(length, false),
        None => default_length,
    };
    if note.dot {
        ticks * 1.5
    } else {
        ticks
    }
}

/// Default length in ticks in effect at `index`
pub fn default_length_at(tokens: &[Token], index: usize) -> f64 {
    tokens[..index.min(tokens.len())]
        .iter()
        .rev()
        .find_map(|token| match token {
            Token::DefaultLength { value, dot } => Some(length_ticks(*value, *dot)),
            _ => None,
        })
        .unwrap_or(QUARTER_NOTE_TICKS)
}

/// Snap floating point drift onto the nearest whole tick
pub fn snap(ticks: f64) -> f64 {
    let rounded = ticks.round();
    if (ticks - rounded).abs() < TICK_EPSILON {
        rounded
    } else {
        ticks
    }
}

/// Convert a tick count that must be whole
pub fn whole_ticks(ticks: f64) -> Result<u32> {
    let snapped = snap(ticks);
    if snapped.fract() != 0.0 || snapped < 0.0 {
        return Err(Error::FractionalLength(ticks));
    }
    Ok(snapped as u32)
}

/// Elapsed ticks after each token.
///
/// Entry `i` is the time at which token `i` finishes; zero-length tokens
/// repeat the running value.
pub fn time_map(tokens: &[Token]) -> Vec<f64> {
    let mut elapsed = 0.0;
    let mut default_length = QUARTER_NOTE_TICKS;

    tokens
        .iter()
        .map(|token| {
            match token {
                Token::Note(note) => elapsed += note_ticks(note, default_length),
                Token::DefaultLength { value, dot } => {
                    default_length = length_ticks(*value, *dot);
                }
                _ => {}
            }
            elapsed = snap(elapsed);
            elapsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::tokenizer::parse_channel;

    #[test]
    fn test_length_ticks() {
        assert_eq!(length_ticks(4, false), 32.0);
        assert_eq!(length_ticks(64, false), 2.0);
        assert_eq!(length_ticks(64, true), 3.0);
        assert_eq!(length_ticks(1, true), 192.0);
    }

    #[test]
    fn test_time_map() {
        let tokens = parse_channel("cl8dt120e4.r").unwrap();
        assert_eq!(
            time_map(&tokens),
            vec![32.0, 32.0, 48.0, 48.0, 96.0, 112.0]
        );
    }

    #[test]
    fn test_time_map_dotted_default() {
        // The dot stays on the l command when the map is built without normalization
        let tokens = parse_channel("l8.cc").unwrap();
        assert_eq!(time_map(&tokens), vec![0.0, 24.0, 48.0]);
    }

    #[test]
    fn test_triplets_snap_to_whole_ticks() {
        let tokens = parse_channel("l12cccccc").unwrap();
        let map = time_map(&tokens);
        assert_eq!(map.last(), Some(&64.0));
        assert!(map.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_default_length_at() {
        let tokens = parse_channel("cl8dl2.e").unwrap();
        assert_eq!(default_length_at(&tokens, 0), 32.0);
        assert_eq!(default_length_at(&tokens, 2), 16.0);
        assert_eq!(default_length_at(&tokens, 4), 96.0);
    }

    #[test]
    fn test_whole_ticks() {
        assert_eq!(whole_ticks(48.0).unwrap(), 48);
        assert_eq!(whole_ticks(47.999_999_999_99).unwrap(), 48);
        assert!(matches!(whole_ticks(42.5), Err(Error::FractionalLength(_))));
    }
}
