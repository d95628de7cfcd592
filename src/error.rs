use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedChar { character: char, position: usize },

    #[error("Expected a number after '{command}' at position {position}")]
    MissingNumber { command: char, position: usize },

    #[error("Invalid note length {value} at position {position}")]
    InvalidLength { value: u32, position: usize },

    #[error("Expected '{0}' marker but not found")]
    MissingMarker(&'static str),

    #[error("Note at index {index} is already dotted and cannot inherit a dotted default length")]
    DottedDefaultConflict { index: usize },

    #[error("Octave {octave} before token {index} cannot be written as an octave command")]
    OctaveOutOfRange { octave: i32, index: usize },

    #[error("Tied note length {0} is not a whole number of ticks")]
    FractionalLength(f64),

    #[error("Assert failure: {0}")]
    Assert(String),

    #[error("Unexpected token in output: {0}")]
    UnexpectedToken(String),

    #[error("Cannot move cursor before the start of input")]
    CursorUnderflow,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
