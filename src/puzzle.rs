//! Domain types and input-file parsing for wordcross problems.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid force line: {0}")]
    InvalidForceLine(String),
    #[error("invalid relative force line: {0}")]
    InvalidRelativeForceLine(String),
    #[error("invalid solver output line: {0}")]
    InvalidSolutionLine(String),
    #[error("word list is empty")]
    EmptyWordList,
    #[error("grid dimensions must be positive")]
    ZeroDimension,
    #[error("lower bound {bound} exceeds word count {words}")]
    LowerBoundTooLarge { bound: usize, words: usize },
    #[error("placement {0} does not fit on the board")]
    PlacementOutOfBounds(String),
    #[error("placed words share more than one cell: {0}")]
    BadIntersection(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "H"),
            Orientation::Vertical => write!(f, "V"),
        }
    }
}

/// Where a word's first letter sits: orientation plus grid coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Anchor {
    pub orientation: Orientation,
    pub row: usize,
    pub col: usize,
}

impl Anchor {
    /// Parses the `O(row,col)` notation used in force files and CNF
    /// comments, e.g. `H(0,3)`.
    pub fn parse(text: &str) -> Option<Anchor> {
        let text = text.trim();
        let (orientation, rest) = if let Some(rest) = text.strip_prefix('H') {
            (Orientation::Horizontal, rest)
        } else if let Some(rest) = text.strip_prefix('V') {
            (Orientation::Vertical, rest)
        } else {
            return None;
        };
        let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
        let (row, col) = inner.split_once(',')?;
        Some(Anchor {
            orientation,
            row: row.trim().parse().ok()?,
            col: col.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.orientation, self.row, self.col)
    }
}

/// One `w1:p1:w2:p2` entry: `w1` crosses `w2` at the `p1`-th letter of
/// `w1` and the `p2`-th letter of `w2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelativeForce {
    pub word1: String,
    pub offset1: usize,
    pub word2: String,
    pub offset2: usize,
}

fn is_skippable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with("//")
}

/// Parses a word list: one word per line, trimmed, blank lines skipped.
/// Line order is significant (it fixes the square-grid symmetry break).
pub fn parse_words(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_words<P: AsRef<Path>>(path: P) -> Result<Vec<String>, PuzzleError> {
    Ok(parse_words(&fs::read_to_string(path)?))
}

/// Parses forced placements, one `word:O(row,col)` per line. `//` comment
/// lines and blank lines are skipped. A repeated word keeps the last entry.
pub fn parse_forces(text: &str) -> Result<HashMap<String, Anchor>, PuzzleError> {
    let mut forces = HashMap::new();
    for line in text.lines() {
        if is_skippable(line) {
            continue;
        }
        let parsed = line
            .trim()
            .split_once(':')
            .and_then(|(word, anchor)| Some((word, Anchor::parse(anchor)?)));
        let Some((word, anchor)) = parsed else {
            return Err(PuzzleError::InvalidForceLine(line.trim().to_string()));
        };
        forces.insert(word.to_string(), anchor);
    }
    Ok(forces)
}

pub fn load_forces<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Anchor>, PuzzleError> {
    parse_forces(&fs::read_to_string(path)?)
}

/// Parses relative forces, one `w1:p1:w2:p2` per line, with the same
/// comment and blank-line conventions as force files.
pub fn parse_relative_forces(text: &str) -> Result<Vec<RelativeForce>, PuzzleError> {
    let mut relforces = Vec::new();
    for line in text.lines() {
        if is_skippable(line) {
            continue;
        }
        let fields: Vec<&str> = line.trim().split(':').collect();
        let parsed = match fields.as_slice() {
            [w1, p1, w2, p2] => p1.parse().ok().zip(p2.parse().ok()).map(|(offset1, offset2)| {
                RelativeForce {
                    word1: w1.to_string(),
                    offset1,
                    word2: w2.to_string(),
                    offset2,
                }
            }),
            _ => None,
        };
        let Some(relforce) = parsed else {
            return Err(PuzzleError::InvalidRelativeForceLine(line.trim().to_string()));
        };
        relforces.push(relforce);
    }
    Ok(relforces)
}

pub fn load_relative_forces<P: AsRef<Path>>(path: P) -> Result<Vec<RelativeForce>, PuzzleError> {
    parse_relative_forces(&fs::read_to_string(path)?)
}
