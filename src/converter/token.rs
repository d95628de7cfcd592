//! Token model for a single MML channel

use serde::Serialize;
use std::fmt;

/// Note pitch letter, or a rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pitch {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    Rest,
}

impl Pitch {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Pitch::A),
            'b' => Some(Pitch::B),
            'c' => Some(Pitch::C),
            'd' => Some(Pitch::D),
            'e' => Some(Pitch::E),
            'f' => Some(Pitch::F),
            'g' => Some(Pitch::G),
            'r' => Some(Pitch::Rest),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Pitch::A => 'a',
            Pitch::B => 'b',
            Pitch::C => 'c',
            Pitch::D => 'd',
            Pitch::E => 'e',
            Pitch::F => 'f',
            Pitch::G => 'g',
            Pitch::Rest => 'r',
        }
    }

    pub fn is_rest(self) -> bool {
        self == Pitch::Rest
    }
}

/// Accidental following a pitch letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Postfix {
    #[default]
    Natural,
    Sharp,
    Flat,
}

/// A note or rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Note {
    pub pitch: Pitch,
    pub postfix: Postfix,
    /// Explicit length denominator (4 = quarter); `None` follows the default length
    pub length: Option<u32>,
    pub dot: bool,
}

impl Note {
    pub fn new(pitch: Pitch, postfix: Postfix) -> Self {
        Self {
            pitch,
            postfix,
            length: None,
            dot: false,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn dotted(mut self) -> Self {
        self.dot = true;
        self
    }
}

/// One MML command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    Tempo { value: u32 },
    DefaultLength { value: u32, dot: bool },
    Volume { value: u32 },
    Sustain { value: u32 },
    Octave { value: i32 },
    OctaveShift { up: bool },
    /// Semitone number; removed during normalization
    AbsoluteNote { value: u32 },
    Note(Note),
    Tie,
}

impl Token {
    pub fn is_tempo(&self) -> bool {
        matches!(self, Token::Tempo { .. })
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Token::Note(note) => Some(note),
            _ => None,
        }
    }

    /// Short kind name, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Tempo { .. } => "tempo",
            Token::DefaultLength { .. } => "default_length",
            Token::Volume { .. } => "volume",
            Token::Sustain { .. } => "sustain",
            Token::Octave { .. } => "octave",
            Token::OctaveShift { .. } => "octave_shift",
            Token::AbsoluteNote { .. } => "absolute_note",
            Token::Note(_) => "note",
            Token::Tie => "tie",
        }
    }
}

impl From<Note> for Token {
    fn from(note: Note) -> Self {
        Token::Note(note)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pitch.as_char())?;
        match self.postfix {
            Postfix::Natural => {}
            Postfix::Sharp => write!(f, "+")?,
            Postfix::Flat => write!(f, "-")?,
        }
        if let Some(length) = self.length {
            write!(f, "{}", length)?;
        }
        if self.dot {
            write!(f, ".")?;
        }
        Ok(())
    }
}
