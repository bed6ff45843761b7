//! Decoding of solver output back into grids, force files and blocking
//! clauses.
//!
//! The encoder records one comment per placement variable; everything
//! here works from those comments plus the `v` lines of a SAT solver's
//! output, so no encoder state needs to survive between the two runs.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::puzzle::{Anchor, Orientation, PuzzleError};

/// A placement variable recovered from a `var <id> == <WORD> at O(r,c)`
/// comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPlacement {
    pub word: String,
    pub anchor: Anchor,
}

impl DecodedPlacement {
    /// The cells this placement covers, with the letter each one shows.
    pub fn cells(&self) -> Vec<(usize, usize, char)> {
        let Anchor { orientation, row, col } = self.anchor;
        self.word
            .chars()
            .enumerate()
            .map(|(i, ch)| match orientation {
                Orientation::Horizontal => (row, col + i, ch),
                Orientation::Vertical => (row + i, col, ch),
            })
            .collect()
    }
}

impl fmt::Display for DecodedPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.word, self.anchor)
    }
}

fn parse_placement_comment(text: &str) -> Option<(isize, DecodedPlacement)> {
    let rest = text.strip_prefix("var ")?;
    let (id, rest) = rest.split_once(" == ")?;
    let (word, anchor) = rest.rsplit_once(" at ")?;
    let var = id.trim().parse().ok()?;
    let anchor = Anchor::parse(anchor)?;
    Some((
        var,
        DecodedPlacement {
            word: word.to_string(),
            anchor,
        },
    ))
}

/// Extracts the placement variables from the comment header of a DIMACS
/// file. Comments that aren't placement records (relative-force notes,
/// say) are skipped; scanning stops at the first clause line.
pub fn placements_from_comments(cnf_text: &str) -> HashMap<isize, DecodedPlacement> {
    let mut placements = HashMap::new();
    for line in cnf_text.lines() {
        if line.starts_with('p') {
            continue;
        }
        let Some(comment) = line.strip_prefix("c ") else {
            if line.starts_with('c') {
                continue;
            }
            break;
        };
        if let Some((var, placement)) = parse_placement_comment(comment) {
            placements.insert(var, placement);
        }
    }
    placements
}

/// Collects the positive literals from the `v` lines of solver output,
/// in the order the solver printed them.
pub fn positive_literals(solution_text: &str) -> Result<Vec<isize>, PuzzleError> {
    let mut positives = Vec::new();
    for line in solution_text.lines() {
        let Some(rest) = line.strip_prefix('v') else {
            continue;
        };
        for token in rest.split_whitespace() {
            let value: isize = token
                .parse()
                .map_err(|_| PuzzleError::InvalidSolutionLine(line.to_string()))?;
            if value > 0 {
                positives.push(value);
            }
        }
    }
    Ok(positives)
}

/// The placements whose variables are true in the solution, in solution
/// order.
pub fn chosen_placements<'a>(
    placements: &'a HashMap<isize, DecodedPlacement>,
    positives: &[isize],
) -> Vec<&'a DecodedPlacement> {
    positives
        .iter()
        .filter_map(|var| placements.get(var))
        .collect()
}

/// A rendered grid: letters where words sit, spaces elsewhere.
pub struct Board {
    cells: Vec<Vec<char>>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Board {
        Board {
            cells: vec![vec![' '; cols]; rows],
        }
    }

    pub fn place(&mut self, placement: &DecodedPlacement) -> Result<(), PuzzleError> {
        for (r, c, ch) in placement.cells() {
            let cell = self
                .cells
                .get_mut(r)
                .and_then(|row| row.get_mut(c))
                .ok_or_else(|| PuzzleError::PlacementOutOfBounds(placement.to_string()))?;
            *cell = ch;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for &cell in row {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders the solution onto a fresh `rows x cols` board.
pub fn decode_board(
    cnf_text: &str,
    solution_text: &str,
    rows: usize,
    cols: usize,
) -> Result<Board, PuzzleError> {
    let placements = placements_from_comments(cnf_text);
    let positives = positive_literals(solution_text)?;
    let mut board = Board::new(rows, cols);
    for placement in chosen_placements(&placements, &positives) {
        board.place(placement)?;
    }
    Ok(board)
}

/// One `WORD:O(r,c)` line per chosen placement, reusable as a force file
/// for a later run.
pub fn force_lines(cnf_text: &str, solution_text: &str) -> Result<Vec<String>, PuzzleError> {
    let placements = placements_from_comments(cnf_text);
    let positives = positive_literals(solution_text)?;
    Ok(chosen_placements(&placements, &positives)
        .iter()
        .map(|p| p.to_string())
        .collect())
}

/// Derives `w1:i1:w2:i2` relative-force lines from every pair of placed
/// words that share a cell. Two placements sharing more than one cell
/// cannot happen for a legal encoding and is reported as a bug.
pub fn relative_lines(cnf_text: &str, solution_text: &str) -> Result<Vec<String>, PuzzleError> {
    let placements = placements_from_comments(cnf_text);
    let positives = positive_literals(solution_text)?;
    let chosen = chosen_placements(&placements, &positives);

    // Keyed by word, first-seen order; a repeated word keeps its last
    // placement.
    let mut order: Vec<&str> = Vec::new();
    let mut by_word: HashMap<&str, &DecodedPlacement> = HashMap::new();
    for placement in chosen.iter().copied() {
        if by_word.insert(placement.word.as_str(), placement).is_none() {
            order.push(placement.word.as_str());
        }
    }

    let mut lines = Vec::new();
    for (i, w1) in order.iter().enumerate() {
        for w2 in &order[i + 1..] {
            let p1 = by_word[w1];
            let p2 = by_word[w2];
            let cells1: HashSet<(usize, usize)> =
                p1.cells().into_iter().map(|(r, c, _)| (r, c)).collect();
            let shared: Vec<(usize, usize)> = p2
                .cells()
                .into_iter()
                .map(|(r, c, _)| (r, c))
                .filter(|cell| cells1.contains(cell))
                .collect();
            let (r, c) = match shared.as_slice() {
                [] => continue,
                [cell] => *cell,
                _ => {
                    return Err(PuzzleError::BadIntersection(format!(
                        "{p1} and {p2} overlap on {} cells",
                        shared.len()
                    )));
                }
            };
            // For either orientation one of the two terms is zero, so the
            // sum is the letter index of the crossing.
            let i1 = (r - p1.anchor.row) + (c - p1.anchor.col);
            let i2 = (r - p2.anchor.row) + (c - p2.anchor.col);
            lines.push(format!("{w1}:{i1}:{w2}:{i2}"));
        }
    }
    Ok(lines)
}

/// A single DIMACS clause that excludes the solution's exact set of
/// chosen placements from any future run.
pub fn blocking_clause(cnf_text: &str, solution_text: &str) -> Result<String, PuzzleError> {
    let placements = placements_from_comments(cnf_text);
    let positives = positive_literals(solution_text)?;
    let mut tokens: Vec<String> = positives
        .iter()
        .copied()
        .filter(|var| placements.contains_key(var))
        .map(|var| (-var).to_string())
        .collect();
    tokens.push("0".to_string());
    Ok(tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CNF: &str = "\
c var 3 == CAT at H(0,0)
c var 9 == CAR at V(0,0)
c force: CAT at H(0,0) <=> CAR at V(0,0)
p cnf 20 2
1 2 0
-3 9 0
";

    #[test]
    fn test_placements_from_comments() {
        let placements = placements_from_comments(CNF);
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[&3].word, "CAT");
        assert_eq!(
            placements[&9].anchor,
            Anchor {
                orientation: Orientation::Vertical,
                row: 0,
                col: 0
            }
        );
    }

    #[test]
    fn test_comment_scan_stops_at_clause_body() {
        // A clause line ends the header; later c-lines must be ignored.
        let text = "c var 1 == CAT at H(0,0)\np cnf 2 1\n1 0\nc var 2 == DOG at H(1,0)\n";
        let placements = placements_from_comments(text);
        assert_eq!(placements.len(), 1);
    }

    #[test]
    fn test_positive_literals() {
        let text = "s SATISFIABLE\nv 1 -2 3 0\nv 9 -10 0\n";
        assert_eq!(positive_literals(text).unwrap(), vec![1, 3, 9]);
    }

    #[test]
    fn test_positive_literals_rejects_garbage() {
        assert!(matches!(
            positive_literals("v 1 two 0\n"),
            Err(PuzzleError::InvalidSolutionLine(_))
        ));
    }

    #[test]
    fn test_decode_board_renders_crossing() {
        let board = decode_board(CNF, "v 3 9 0\n", 3, 3).unwrap();
        assert_eq!(board.to_string(), "CAT\nA  \nR  \n");
    }

    #[test]
    fn test_decode_board_out_of_bounds() {
        assert!(matches!(
            decode_board(CNF, "v 3 0\n", 1, 2),
            Err(PuzzleError::PlacementOutOfBounds(_))
        ));
    }

    #[test]
    fn test_force_lines() {
        let lines = force_lines(CNF, "v 9 3 0\n").unwrap();
        assert_eq!(lines, vec!["CAR:V(0,0)", "CAT:H(0,0)"]);
    }

    #[test]
    fn test_relative_lines() {
        let lines = relative_lines(CNF, "v 3 9 0\n").unwrap();
        assert_eq!(lines, vec!["CAT:0:CAR:0"]);
    }

    #[test]
    fn test_relative_lines_skip_disjoint_pairs() {
        let text = "c var 1 == CAT at H(0,0)\nc var 2 == DOG at H(2,0)\np cnf 2 0\n";
        let lines = relative_lines(text, "v 1 2 0\n").unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_relative_lines_reject_double_overlap() {
        let text = "c var 1 == ABC at H(0,0)\nc var 2 == BCD at H(0,1)\np cnf 2 0\n";
        assert!(matches!(
            relative_lines(text, "v 1 2 0\n"),
            Err(PuzzleError::BadIntersection(_))
        ));
    }

    #[test]
    fn test_blocking_clause() {
        // Only placement variables appear in the blocking clause.
        assert_eq!(blocking_clause(CNF, "v 1 3 9 0\n").unwrap(), "-3 -9 0");
        assert_eq!(blocking_clause(CNF, "v 1 2 0\n").unwrap(), "0");
    }
}
