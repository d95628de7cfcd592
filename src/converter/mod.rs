//! MML converter - tokenizes channels, normalizes them and merges tempo changes
//!
//! Pipeline per channel: parse, expand absolute notes, move default-length
//! dots onto notes, build the time map. The tempo merge then runs across all
//! channels before each one is written back out.

pub mod cursor;
pub mod normalize;
pub mod tempo;
pub mod timing;
pub mod token;
pub mod tokenizer;
pub mod writer;

use crate::container;
use crate::error::{Error, Result};
use tracing::trace;
use std::fs;
use std::path::Path;
use token::Token;

/// One channel's tokens and their end times
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub tokens: Vec<Token>,
    /// Elapsed ticks after each token, aligned with `tokens`
    pub time_map: Vec<f64>,
}

impl Channel {
    /// Parse and normalize one lowercase channel string
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenizer::parse_channel(text)?;
        let tokens = normalize::expand_absolute_notes(tokens)?;
        let tokens = normalize::propagate_default_dots(tokens)?;
        let mut channel = Self {
            tokens,
            time_map: Vec::new(),
        };
        channel.remap();
        Ok(channel)
    }

    /// Rebuild the time map after the tokens changed
    pub fn remap(&mut self) {
        self.time_map = timing::time_map(&self.tokens);
    }

    /// Total length in ticks
    pub fn duration(&self) -> f64 {
        self.time_map.last().copied().unwrap_or(0.0)
    }

    pub fn write(&self) -> Result<String> {
        writer::write_channel(&self.tokens)
    }
}

/// Converter input: a whole `MML@...;` container or already split channels
#[derive(Debug, Clone)]
pub enum MmlInput<'a> {
    Container(&'a str),
    Channels(Vec<String>),
}

impl<'a> From<&'a str> for MmlInput<'a> {
    fn from(mml: &'a str) -> Self {
        MmlInput::Container(mml)
    }
}

impl<'a> From<&'a String> for MmlInput<'a> {
    fn from(mml: &'a String) -> Self {
        MmlInput::Container(mml.as_str())
    }
}

impl From<Vec<String>> for MmlInput<'_> {
    fn from(channels: Vec<String>) -> Self {
        MmlInput::Channels(channels)
    }
}

impl<'a> From<&[&'a str]> for MmlInput<'a> {
    fn from(channels: &[&'a str]) -> Self {
        MmlInput::Channels(channels.iter().map(|c| c.to_string()).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for MmlInput<'a> {
    fn from(channels: [&'a str; N]) -> Self {
        MmlInput::Channels(channels.iter().map(|c| c.to_string()).collect())
    }
}

/// Tempo-synchronizing converter state
#[derive(Debug, Default)]
pub struct Converter {
    channels: Vec<Channel>,
}

impl Converter {
    /// Parse and normalize all channels of `input`
    pub fn new<'a>(input: impl Into<MmlInput<'a>>) -> Result<Self> {
        let texts = match input.into() {
            MmlInput::Container(mml) => container::extract_channels(mml)?,
            MmlInput::Channels(channels) => {
                channels.into_iter().map(|c| c.to_lowercase()).collect()
            }
        };

        let channels = texts
            .iter()
            .map(|text| Channel::parse(text))
            .collect::<Result<Vec<_>>>()?;
        for (i, channel) in channels.iter().enumerate() {
            trace!(
                "channel {}: {} tokens, {} ticks",
                i,
                channel.tokens.len(),
                channel.duration()
            );
        }

        Ok(Self { channels })
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Merge tempo changes across all channels
    pub fn merge_tempo(&mut self) -> Result<()> {
        tempo::merge_tempo_events(&mut self.channels)
    }

    /// Write every channel back to text
    pub fn write_channels(&self) -> Result<Vec<String>> {
        self.channels.iter().map(Channel::write).collect()
    }
}

/// Convert to per-channel strings without the container
pub fn convert_as_array<'a>(input: impl Into<MmlInput<'a>>) -> Result<Vec<String>> {
    let mut converter = Converter::new(input)?;
    converter.merge_tempo()?;
    converter.write_channels()
}

/// Convert to a `MML@...;` container
pub fn convert<'a>(input: impl Into<MmlInput<'a>>) -> Result<String> {
    let channels = convert_as_array(input)?;
    Ok(container::wrap_channels(&channels))
}

/// Convert a container read from a file
pub fn convert_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path.display(), e),
        ))
    })?;
    convert(text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_at_start_of_other_channel() {
        let channels = convert_as_array("MML@l8cde,l4t120cde;").unwrap();
        assert_eq!(channels, vec!["t120l8cde", "l4t120cde"]);
    }

    #[test]
    fn test_no_tempo_is_noop() {
        assert_eq!(convert("MML@l4ceg;").unwrap(), "MML@l4ceg;");
    }

    #[test]
    fn test_absolute_note_in_current_octave() {
        assert_eq!(convert("MML@n48;").unwrap(), "MML@c;");
    }

    #[test]
    fn test_dotted_default_written_on_notes() {
        assert_eq!(convert("MML@l8.cd4e;").unwrap(), "MML@l8c.d4e.;");
    }

    #[test]
    fn test_channels_input_is_lowercased() {
        let channels = convert_as_array(["T90C", "D2"]).unwrap();
        assert_eq!(channels, vec!["t90c", "t90d2"]);
    }

    #[test]
    fn test_parse_error_propagates() {
        assert!(matches!(
            convert("MML@cde,cxe;"),
            Err(Error::UnexpectedChar { character: 'x', position: 1 })
        ));
    }

    #[test]
    fn test_channel_duration() {
        let channel = Channel::parse("l8.cc4").unwrap();
        assert_eq!(channel.duration(), 56.0);
        assert_eq!(channel.time_map, vec![0.0, 24.0, 56.0]);
    }
}
