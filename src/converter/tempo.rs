//! Cross-channel tempo synchronization
//!
//! Tempo commands in MML only affect the channel they are written in, but
//! players expect every channel to change speed together. Every tempo change
//! found in any channel is copied into all other channels at the same tick
//! position, splitting a note into tied pieces when the change falls inside it.

use super::timing::{self, note_ticks, TICK_EPSILON, WHOLE_NOTE_TICKS};
use super::token::{Note, Token};
use super::Channel;
use crate::error::{Error, Result};
use tracing::{debug, trace};

/// A tempo command found in one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEvent {
    /// Ticks from the channel start
    pub time: f64,
    /// Channel the command was written in
    pub channel: usize,
    /// Token index within that channel
    pub index: usize,
    pub tempo: Token,
}

/// Where a tempo event lands inside a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Insertion {
    /// Between two tokens
    At(usize),
    /// Inside the note at this index
    Split { index: usize, start: f64, end: f64 },
}

/// Gather every tempo command, latest first.
///
/// Events at equal times keep channel-then-index order.
pub fn collect_events(channels: &[Channel]) -> Vec<TempoEvent> {
    let mut events: Vec<TempoEvent> = channels
        .iter()
        .enumerate()
        .flat_map(|(channel, ch)| {
            ch.tokens
                .iter()
                .enumerate()
                .filter(|(_, token)| token.is_tempo())
                .map(move |(index, token)| TempoEvent {
                    time: ch.time_map[index],
                    channel,
                    index,
                    tempo: *token,
                })
        })
        .collect();

    events.sort_by(|a, b| b.time.total_cmp(&a.time));
    events
}

/// Copy every tempo change into every channel that lacks one at that time
pub fn merge_tempo_events(channels: &mut [Channel]) -> Result<()> {
    let events = collect_events(channels);
    debug!("pooled {} tempo events", events.len());

    for group in events.chunk_by(|a, b| (a.time - b.time).abs() < TICK_EPSILON) {
        let Some(event) = group_tempo(group) else {
            continue;
        };
        for (i, channel) in channels.iter_mut().enumerate() {
            if group.iter().any(|e| e.channel == i) {
                continue;
            }
            insert_tempo(channel, event.time, event.tempo)?;
        }
    }

    Ok(())
}

/// The tempo a time group copies into other channels.
///
/// The lowest channel wins; within it the last command is the one in effect.
fn group_tempo(group: &[TempoEvent]) -> Option<TempoEvent> {
    let channel = group.iter().map(|e| e.channel).min()?;
    group
        .iter()
        .filter(|e| e.channel == channel)
        .max_by_key(|e| e.index)
        .copied()
}

/// Insert `tempo` into one channel at tick `time`
pub fn insert_tempo(channel: &mut Channel, time: f64, tempo: Token) -> Result<()> {
    let Some(insertion) = find_insertion(&channel.tokens, &channel.time_map, time)? else {
        trace!("tempo at {} is past the channel end", time);
        return Ok(());
    };

    match insertion {
        Insertion::At(index) => {
            debug!("inserting {:?} at index {} (tick {})", tempo, index, time);
            channel.tokens.insert(index, tempo);
        }
        Insertion::Split { index, start, end } => {
            let Token::Note(note) = channel.tokens[index] else {
                return Err(Error::Assert(format!(
                    "token {} spanning tick {} is not a note",
                    index, time
                )));
            };
            let default_length = timing::default_length_at(&channel.tokens, index);
            let full = note_ticks(&note, default_length);
            let gap = timing::whole_ticks(end - time)?;
            let broken = timing::whole_ticks(full - gap as f64)?;
            debug!(
                "splitting note {} at index {} ([{}, {}) at tick {}) into {} + {}",
                note, index, start, end, time, broken, gap
            );

            let mut replacement = tied_notes(&note, broken)?;
            replacement.push(Token::Tie);
            replacement.push(tempo);
            replacement.extend(tied_notes(&note, gap)?);
            channel.tokens.splice(index..=index, replacement);
        }
    }

    channel.remap();
    Ok(())
}

/// Locate the insertion point for tick `time`.
///
/// Returns `None` when the channel has no material at or after `time`.
pub fn find_insertion(tokens: &[Token], time_map: &[f64], time: f64) -> Result<Option<Insertion>> {
    let Some(index) = time_map.iter().position(|&end| end > time + TICK_EPSILON) else {
        return Ok(None);
    };

    let start = if index == 0 { 0.0 } else { time_map[index - 1] };
    if time < start - TICK_EPSILON {
        return Err(Error::Assert(format!(
            "tick {} is before token {} starting at {}",
            time, index, start
        )));
    }

    if time > start + TICK_EPSILON {
        return Ok(Some(Insertion::Split {
            index,
            start,
            end: time_map[index],
        }));
    }

    // Clean boundary: place the change right after the previous note so that
    // it precedes any length, volume or octave commands before the next one
    let at = tokens[..index]
        .iter()
        .rposition(|token| matches!(token, Token::Note(_)))
        .map_or(0, |i| i + 1);
    Ok(Some(Insertion::At(at)))
}

/// Tied notes with undotted power-of-two lengths summing to `ticks`.
///
/// Pieces are capped at a whole note. A 1-tick piece is written as a
/// 128th note (`c128`), which the 2-digit note length of
/// [`parse_channel`](super::tokenizer::parse_channel) cannot read back.
pub fn tied_notes(base: &Note, ticks: u32) -> Result<Vec<Token>> {
    if ticks == 0 {
        return Err(Error::Assert("tied note length must be positive".to_string()));
    }

    let mut tokens = Vec::new();
    let mut remaining = ticks;
    while remaining > 0 {
        let piece = largest_power_of_two(remaining).min(WHOLE_NOTE_TICKS);
        remaining -= piece;
        tokens.push(Token::Note(Note {
            pitch: base.pitch,
            postfix: base.postfix,
            length: Some(WHOLE_NOTE_TICKS / piece),
            dot: false,
        }));
        if remaining > 0 {
            tokens.push(Token::Tie);
        }
    }
    Ok(tokens)
}

fn largest_power_of_two(value: u32) -> u32 {
    1 << (u32::BITS - 1 - value.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::token::{Pitch, Postfix};

    fn channel(text: &str) -> Channel {
        Channel::parse(text).unwrap()
    }

    fn lengths(tokens: &[Token]) -> Vec<u32> {
        tokens
            .iter()
            .filter_map(|t| t.as_note().and_then(|n| n.length))
            .collect()
    }

    #[test]
    fn test_tied_notes_sum() {
        let base = Note::new(Pitch::E, Postfix::Flat).dotted();
        for ticks in 1..256u32 {
            let tokens = tied_notes(&base, ticks).unwrap();
            let pieces = lengths(&tokens);
            let sum: u32 = pieces.iter().map(|l| WHOLE_NOTE_TICKS / l).sum();
            assert_eq!(sum, ticks);
            assert_eq!(pieces.len() as u32, ticks.count_ones());
            assert!(pieces.iter().all(|l| l.is_power_of_two() && *l <= WHOLE_NOTE_TICKS));
            assert_eq!(
                tokens.iter().filter(|t| matches!(t, Token::Tie)).count(),
                pieces.len() - 1
            );
            assert!(tokens
                .iter()
                .filter_map(Token::as_note)
                .all(|n| n.pitch == Pitch::E && n.postfix == Postfix::Flat && !n.dot));
        }
    }

    #[test]
    fn test_tied_notes_caps_at_whole() {
        let tokens = tied_notes(&Note::new(Pitch::C, Postfix::Natural), 288).unwrap();
        assert_eq!(lengths(&tokens), vec![1, 1, 4]);
    }

    #[test]
    fn test_tied_notes_zero() {
        assert!(tied_notes(&Note::new(Pitch::C, Postfix::Natural), 0).is_err());
    }

    #[test]
    fn test_find_insertion_boundaries() {
        let ch = channel("l8cdv5e");
        // Before the first note, ahead of the l command
        assert_eq!(
            find_insertion(&ch.tokens, &ch.time_map, 0.0).unwrap(),
            Some(Insertion::At(0))
        );
        // After d, ahead of v5
        assert_eq!(
            find_insertion(&ch.tokens, &ch.time_map, 32.0).unwrap(),
            Some(Insertion::At(3))
        );
        // Inside c
        assert_eq!(
            find_insertion(&ch.tokens, &ch.time_map, 4.0).unwrap(),
            Some(Insertion::Split {
                index: 1,
                start: 0.0,
                end: 16.0
            })
        );
        // At or past the end
        assert_eq!(find_insertion(&ch.tokens, &ch.time_map, 48.0).unwrap(), None);
        assert_eq!(find_insertion(&ch.tokens, &ch.time_map, 100.0).unwrap(), None);
    }

    #[test]
    fn test_split_note() {
        let mut ch = channel("c2");
        insert_tempo(&mut ch, 16.0, Token::Tempo { value: 90 }).unwrap();
        assert_eq!(ch.write().unwrap(), "c8&t90c4&c8");
        assert_eq!(ch.time_map.last(), Some(&64.0));
    }

    #[test]
    fn test_split_dotted_default_note() {
        // l4. c spans [0, 48); a change at 8 leaves 8 + 40 ticks
        let mut ch = channel("l4.c");
        insert_tempo(&mut ch, 8.0, Token::Tempo { value: 150 }).unwrap();
        assert_eq!(ch.write().unwrap(), "l4c16&t150c4&c16");
    }

    #[test]
    fn test_fractional_split_fails() {
        let mut ch = channel("l3c");
        let err = insert_tempo(&mut ch, 16.0, Token::Tempo { value: 120 }).unwrap_err();
        assert!(matches!(err, Error::FractionalLength(_)));
    }

    #[test]
    fn test_collect_events_order() {
        let channels = vec![channel("t100cct110c"), channel("ct120c")];
        let events = collect_events(&channels);
        let summary: Vec<(f64, usize, usize)> =
            events.iter().map(|e| (e.time, e.channel, e.index)).collect();
        assert_eq!(summary, vec![(64.0, 0, 3), (32.0, 1, 1), (0.0, 0, 0)]);
    }

    #[test]
    fn test_merge_uses_last_tempo_of_channel() {
        let mut channels = vec![channel("c4t100l8t150c"), channel("c2")];
        merge_tempo_events(&mut channels).unwrap();
        assert_eq!(channels[1].write().unwrap(), "c4&t150c4");
        assert_eq!(channels[0].write().unwrap(), "c4t100l8t150c");
    }

    #[test]
    fn test_group_tempo_prefers_lowest_channel() {
        let event = |channel, index, value| TempoEvent {
            time: 32.0,
            channel,
            index,
            tempo: Token::Tempo { value },
        };
        let group = [event(2, 1, 90), event(1, 3, 100), event(1, 5, 110), event(2, 4, 120)];
        assert_eq!(group_tempo(&group), Some(group[2]));
        assert_eq!(group_tempo(&[]), None);
    }

    #[test]
    fn test_merge_same_time_prefers_first_channel() {
        let mut channels = vec![channel("t100c"), channel("t120c"), channel("c")];
        merge_tempo_events(&mut channels).unwrap();
        let written: Vec<String> = channels.iter().map(|c| c.write().unwrap()).collect();
        assert_eq!(written, vec!["t100c", "t120c", "t100c"]);
    }
}
