// src/core/grammar.rs

//! The command grammar understood by the robot server.
//!
//! A command is either one of the special words (`stop`, `status`, `quit`,
//! `help`, any case) or a `;`-separated movement sequence such as
//! `10F;5R;2.5B`. Each movement segment is a non-negative decimal magnitude
//! followed by exactly one direction letter. Empty segments are skipped, so a
//! trailing `;` is accepted.
//!
//! Parsing is a single left-to-right scan over each segment; there is no
//! regex engine involved.

use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Separator between movement segments.
pub const SEGMENT_SEPARATOR: char = ';';

/// Words that bypass the movement grammar entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SpecialCommand {
    /// Halt the robot and clear its queued movements.
    Stop,
    /// Ask the server for the robot's position and wheel speeds.
    Status,
    /// End the session.
    Quit,
    /// Show usage; normally answered locally by the front-end.
    Help,
}

/// The direction letter of a movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    /// Maps a direction letter (any case) to a `Direction`.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'F' => Some(Direction::Forward),
            'B' => Some(Direction::Backward),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    /// The canonical, uppercase wire letter.
    pub fn letter(self) -> char {
        match self {
            Direction::Forward => 'F',
            Direction::Backward => 'B',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

/// A non-negative decimal magnitude, kept exactly as the user wrote it so the
/// wire form never picks up float formatting artefacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Magnitude(String);

impl Magnitude {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `(magnitude, direction)` element of a movement sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub magnitude: Magnitude,
    pub direction: Direction,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.direction.letter())
    }
}

/// A validated command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Special(SpecialCommand),
    Movement(Vec<Step>),
}

impl Command {
    pub fn is_special(&self, kind: SpecialCommand) -> bool {
        matches!(self, Command::Special(k) if *k == kind)
    }

    /// The canonical wire text, without the line terminator.
    pub fn to_frame(&self) -> String {
        self.to_string()
    }
}

/// Writes the canonical wire form: special words in lowercase, movement
/// steps with uppercase letters joined by `;`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Special(kind) => f.write_str(kind.as_ref()),
            Command::Movement(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{SEGMENT_SEPARATOR}")?;
                    }
                    write!(f, "{step}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Command {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Why a piece of text is not a command. Segment numbers are 1-based and
/// count empty segments too, so they match what the user typed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("no movement given; use XF;YB;ZL;WR (e.g. 10F;5R)")]
    Empty,

    #[error("segment {segment} '{text}' must start with a number")]
    MissingMagnitude { segment: usize, text: String },

    #[error("segment {segment} '{text}' needs digits after the decimal point")]
    MissingFraction { segment: usize, text: String },

    #[error("segment {segment} '{text}' is missing a direction letter (F, B, L or R)")]
    MissingDirection { segment: usize, text: String },

    #[error("segment {segment} '{text}' has unknown direction '{letter}'; use F, B, L or R")]
    UnknownDirection {
        segment: usize,
        text: String,
        letter: char,
    },

    #[error("segment {segment} '{text}' has unexpected input after the direction letter")]
    TrailingInput { segment: usize, text: String },
}

/// Returns true if `text` is a special word or a well-formed movement sequence.
pub fn validate(text: &str) -> bool {
    parse(text).is_ok()
}

/// Parses `text` into a [`Command`].
pub fn parse(text: &str) -> Result<Command, GrammarError> {
    let text = text.trim();
    if let Ok(special) = text.parse::<SpecialCommand>() {
        return Ok(Command::Special(special));
    }

    let mut steps = Vec::new();
    for (i, raw) in text.split(SEGMENT_SEPARATOR).enumerate() {
        let segment = raw.trim();
        if segment.is_empty() {
            continue;
        }
        steps.push(parse_step(segment, i + 1)?);
    }

    if steps.is_empty() {
        return Err(GrammarError::Empty);
    }
    Ok(Command::Movement(steps))
}

/// Scans `digits [ '.' digits ] letter` over one trimmed, non-empty segment.
fn parse_step(segment: &str, index: usize) -> Result<Step, GrammarError> {
    let bytes = segment.as_bytes();
    let mut pos = leading_digits(bytes);
    if pos == 0 {
        return Err(GrammarError::MissingMagnitude {
            segment: index,
            text: segment.to_string(),
        });
    }

    if bytes.get(pos) == Some(&b'.') {
        let fraction = leading_digits(&bytes[pos + 1..]);
        if fraction == 0 {
            return Err(GrammarError::MissingFraction {
                segment: index,
                text: segment.to_string(),
            });
        }
        pos += 1 + fraction;
    }

    // Everything up to `pos` is ASCII, so this is a char boundary.
    let (number, rest) = segment.split_at(pos);
    let mut rest = rest.chars();
    let letter = rest.next().ok_or_else(|| GrammarError::MissingDirection {
        segment: index,
        text: segment.to_string(),
    })?;
    let direction = Direction::from_letter(letter).ok_or_else(|| GrammarError::UnknownDirection {
        segment: index,
        text: segment.to_string(),
        letter,
    })?;
    if rest.next().is_some() {
        return Err(GrammarError::TrailingInput {
            segment: index,
            text: segment.to_string(),
        });
    }

    Ok(Step {
        magnitude: Magnitude(number.to_string()),
        direction,
    })
}

fn leading_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
