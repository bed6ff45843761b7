//! The wordcross encoder: translates "these words form a connected
//! crossword-style layout on a rows x cols grid" into CNF.
//!
//! The propositional vocabulary is organized per cell (`pos`, `hvar`,
//! `vvar`, `stop`), per word placement (`place`, `used`), and per word
//! pair (`intersect`, plus the iterated reachability levels that make the
//! word-intersection graph connected). A satisfying assignment of the
//! emitted formula corresponds to exactly one legal layout.

use std::collections::{BTreeSet, HashMap};
use std::io;

use crate::cardinality::{at_least_n_true, at_most_n_true, at_most_one_true};
use crate::cnf::Cnf;
use crate::puzzle::{Anchor, Orientation, PuzzleError, RelativeForce};

/// A wordcross problem instance: the words to place and the grid size.
pub struct Wordcross {
    words: Vec<String>,
    rows: usize,
    cols: usize,
}

impl Wordcross {
    pub fn new(words: Vec<String>, rows: usize, cols: usize) -> Result<Self, PuzzleError> {
        if words.is_empty() {
            return Err(PuzzleError::EmptyWordList);
        }
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::ZeroDimension);
        }
        Ok(Wordcross { words, rows, cols })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

#[derive(Default)]
pub struct EncodeOptions {
    /// Emit the redundant stop/pos witness guards as well.
    pub extra: bool,
    /// Window half-width applied to absolute forces.
    pub jitter: usize,
    /// Require at least this many words placed (default: all of them).
    pub lowerbound: Option<usize>,
    /// Allow at most this many unoccupied cells.
    pub empty: Option<usize>,
    pub forces: HashMap<String, Anchor>,
    pub relative_forces: Vec<RelativeForce>,
}

/// Encodes the puzzle into `cnf`. On success the sink holds the complete
/// formula; on error nothing useful has been emitted and the sink should
/// be discarded.
pub fn generate_clauses(
    cnf: &mut Cnf,
    puzzle: &Wordcross,
    opts: &EncodeOptions,
) -> Result<(), PuzzleError> {
    if let Some(bound) = opts.lowerbound {
        if bound > puzzle.words.len() {
            return Err(PuzzleError::LowerBoundTooLarge {
                bound,
                words: puzzle.words.len(),
            });
        }
    }

    let mut encoder = Encoder::new(cnf, puzzle);
    encoder.build_cells()?;
    encoder.build_placements()?;
    encoder.assert_used_bound(opts.lowerbound)?;
    encoder.build_intersections()?;
    encoder.build_reachability()?;
    if let Some(limit) = opts.empty {
        encoder.cap_empty_cells(limit)?;
    }
    encoder.guard_witnesses(opts.extra)?;
    encoder.apply_forces(&opts.forces, opts.jitter)?;
    encoder.apply_relative_forces(&opts.relative_forces)?;
    Ok(())
}

/// Owns every variable table for one encoding run. Tables are dropped
/// with the encoder; the variable IDs written into the sink are the only
/// handle downstream tools need.
struct Encoder<'a> {
    cnf: &'a mut Cnf,
    words: &'a [String],
    rows: usize,
    cols: usize,
    letters: Vec<char>,
    pos: HashMap<(char, usize, usize), isize>,
    hvar: Vec<Vec<isize>>,
    vvar: Vec<Vec<isize>>,
    stop: Vec<Vec<isize>>,
    placements: Vec<Vec<(Anchor, isize)>>,
    placement_index: Vec<HashMap<Anchor, isize>>,
    used: Vec<isize>,
    hvar_witness: HashMap<(usize, usize), Vec<isize>>,
    vvar_witness: HashMap<(usize, usize), Vec<isize>>,
    stop_witness: HashMap<(usize, usize), Vec<isize>>,
    pos_witness: HashMap<(char, usize, usize), Vec<isize>>,
    intersects: HashMap<(usize, usize), isize>,
}

impl<'a> Encoder<'a> {
    fn new(cnf: &'a mut Cnf, puzzle: &'a Wordcross) -> Self {
        // Sorted for deterministic variable allocation.
        let letters: BTreeSet<char> = puzzle.words.iter().flat_map(|w| w.chars()).collect();
        let word_count = puzzle.words.len();
        Encoder {
            cnf,
            words: &puzzle.words,
            rows: puzzle.rows,
            cols: puzzle.cols,
            letters: letters.into_iter().collect(),
            pos: HashMap::new(),
            hvar: Vec::new(),
            vvar: Vec::new(),
            stop: Vec::new(),
            placements: vec![Vec::new(); word_count],
            placement_index: vec![HashMap::new(); word_count],
            used: Vec::new(),
            hvar_witness: HashMap::new(),
            vvar_witness: HashMap::new(),
            stop_witness: HashMap::new(),
            pos_witness: HashMap::new(),
            intersects: HashMap::new(),
        }
    }

    /// Allocates the per-cell vocabulary and emits the constraints that
    /// hold regardless of which words are placed: at most one letter per
    /// cell, stops exclude occupancy, and occupied cells in the same
    /// direction cannot abut across word boundaries.
    fn build_cells(&mut self) -> io::Result<()> {
        let letters = std::mem::take(&mut self.letters);
        for r in 0..self.rows {
            for c in 0..self.cols {
                let mut vs = Vec::with_capacity(letters.len());
                for &ch in &letters {
                    let v = self.cnf.new_var();
                    self.pos.insert((ch, r, c), v);
                    vs.push(v);
                }
                at_most_one_true(self.cnf, &vs)?;
            }
        }
        self.letters = letters;

        for _ in 0..self.rows {
            let mut hrow = Vec::with_capacity(self.cols);
            let mut vrow = Vec::with_capacity(self.cols);
            let mut srow = Vec::with_capacity(self.cols);
            for _ in 0..self.cols {
                hrow.push(self.cnf.new_var());
                vrow.push(self.cnf.new_var());
                srow.push(self.cnf.new_var());
            }
            self.hvar.push(hrow);
            self.vvar.push(vrow);
            self.stop.push(srow);
        }

        // A stop is the gap just outside a word; it can't also be on one.
        for r in 0..self.rows {
            for c in 0..self.cols {
                self.cnf.write_clause(&[-self.hvar[r][c], -self.stop[r][c]])?;
                self.cnf.write_clause(&[-self.vvar[r][c], -self.stop[r][c]])?;
            }
        }

        // Two hvars can't be vertically adjacent unless they're also vvars.
        for r in 0..self.rows.saturating_sub(1) {
            for c in 0..self.cols {
                self.cnf
                    .write_clause(&[-self.hvar[r][c], -self.hvar[r + 1][c], self.vvar[r][c]])?;
                self.cnf
                    .write_clause(&[-self.hvar[r][c], -self.hvar[r + 1][c], self.vvar[r + 1][c]])?;
            }
        }

        // Two vvars can't be horizontally adjacent unless they're also hvars.
        for r in 0..self.rows {
            for c in 0..self.cols.saturating_sub(1) {
                self.cnf
                    .write_clause(&[-self.vvar[r][c], -self.vvar[r][c + 1], self.hvar[r][c]])?;
                self.cnf
                    .write_clause(&[-self.vvar[r][c], -self.vvar[r][c + 1], self.hvar[r][c + 1]])?;
            }
        }
        Ok(())
    }

    fn add_placement(&mut self, wi: usize, anchor: Anchor, v: isize) {
        self.placements[wi].push((anchor, v));
        self.placement_index[wi].insert(anchor, v);
    }

    /// Introduces one placement variable per word and fitting anchor, ties
    /// it to the cell vocabulary, and defines `used[w]` per word.
    fn build_placements(&mut self) -> io::Result<()> {
        let words = self.words;
        for (wi, word) in words.iter().enumerate() {
            let chars: Vec<char> = word.chars().collect();
            let len = chars.len();
            let mut vs = Vec::new();

            if len <= self.cols {
                for r in 0..self.rows {
                    for c in 0..=self.cols - len {
                        let v = self.cnf.new_var();
                        self.cnf.add_comment(format!("var {v} == {word} at H({r},{c})"));
                        if c > 0 {
                            self.cnf.write_clause(&[-v, self.stop[r][c - 1]])?;
                            self.stop_witness.entry((r, c - 1)).or_default().push(v);
                        }
                        for (i, &ch) in chars.iter().enumerate() {
                            let p = self.pos[&(ch, r, c + i)];
                            self.cnf.write_clause(&[-v, p])?;
                            self.pos_witness.entry((ch, r, c + i)).or_default().push(v);
                            self.cnf.write_clause(&[-v, self.hvar[r][c + i]])?;
                            self.hvar_witness.entry((r, c + i)).or_default().push(v);
                        }
                        if c + len < self.cols {
                            self.cnf.write_clause(&[-v, self.stop[r][c + len]])?;
                            self.stop_witness.entry((r, c + len)).or_default().push(v);
                        }
                        let anchor = Anchor {
                            orientation: Orientation::Horizontal,
                            row: r,
                            col: c,
                        };
                        self.add_placement(wi, anchor, v);
                        vs.push(v);
                    }
                }
            }

            // Square grids are symmetric under a quarter turn; pinning the
            // first word to horizontal placements breaks that symmetry.
            let symmetry_broken = self.rows == self.cols && wi == 0;
            if !symmetry_broken && len <= self.rows {
                for r in 0..=self.rows - len {
                    for c in 0..self.cols {
                        let v = self.cnf.new_var();
                        self.cnf.add_comment(format!("var {v} == {word} at V({r},{c})"));
                        if r > 0 {
                            self.cnf.write_clause(&[-v, self.stop[r - 1][c]])?;
                            self.stop_witness.entry((r - 1, c)).or_default().push(v);
                        }
                        for (i, &ch) in chars.iter().enumerate() {
                            let p = self.pos[&(ch, r + i, c)];
                            self.cnf.write_clause(&[-v, p])?;
                            self.pos_witness.entry((ch, r + i, c)).or_default().push(v);
                            self.cnf.write_clause(&[-v, self.vvar[r + i][c]])?;
                            self.vvar_witness.entry((r + i, c)).or_default().push(v);
                        }
                        if r + len < self.rows {
                            self.cnf.write_clause(&[-v, self.stop[r + len][c]])?;
                            self.stop_witness.entry((r + len, c)).or_default().push(v);
                        }
                        let anchor = Anchor {
                            orientation: Orientation::Vertical,
                            row: r,
                            col: c,
                        };
                        self.add_placement(wi, anchor, v);
                        vs.push(v);
                    }
                }
            }

            at_most_one_true(self.cnf, &vs)?;
            let used = self.cnf.disjunction_witness(&vs, None)?;
            self.used.push(used);
        }
        Ok(())
    }

    /// Without a lower bound every word must be used; with one, at least
    /// that many.
    fn assert_used_bound(&mut self, lowerbound: Option<usize>) -> io::Result<()> {
        match lowerbound {
            None => {
                for i in 0..self.used.len() {
                    self.cnf.write_clause(&[self.used[i]])?;
                }
            }
            Some(bound) => at_least_n_true(self.cnf, self.used.clone(), bound)?,
        }
        Ok(())
    }

    /// Unordered word-pair key, normalized by lexicographic order of the
    /// word strings.
    fn pair_key(&self, i: usize, j: usize) -> (usize, usize) {
        if self.words[i] <= self.words[j] { (i, j) } else { (j, i) }
    }

    /// For each pair of placements of two different words that would share
    /// a cell with agreeing letters, emits a conjunction witness; the
    /// per-pair `intersect` variable is the disjunction of those. Pairs
    /// with no geometric crossing get no entry at all.
    fn build_intersections(&mut self) -> io::Result<()> {
        let word_count = self.words.len();
        let mut disjunctions: HashMap<(usize, usize), Vec<isize>> = HashMap::new();
        for i in 0..word_count {
            for j in i + 1..word_count {
                let key = self.pair_key(i, j);
                for pi in 0..self.placements[i].len() {
                    for pj in 0..self.placements[j].len() {
                        let (a1, v1) = self.placements[i][pi];
                        let (a2, v2) = self.placements[j][pj];
                        if intersection_cell(&self.words[i], a1, &self.words[j], a2).is_none() {
                            continue;
                        }
                        let cij = self.cnf.conjunction_witness(&[v1, v2], None)?;
                        disjunctions.entry(key).or_default().push(cij);
                    }
                }
            }
        }
        for i in 0..word_count {
            for j in i + 1..word_count {
                let key = self.pair_key(i, j);
                if let Some(dis) = disjunctions.get(&key) {
                    let v = self.cnf.disjunction_witness(dis, None)?;
                    self.intersects.insert(key, v);
                }
            }
        }
        Ok(())
    }

    fn fresh_false(&mut self) -> io::Result<isize> {
        let v = self.cnf.new_var();
        self.cnf.write_clause(&[-v])?;
        Ok(v)
    }

    /// Builds W-1 reachability levels over word pairs and asserts that any
    /// two used words are connected through intersections. Level i means
    /// "connected by a path of at most i+1 intersections"; depth W-1 is
    /// enough because a connected graph on W nodes has a spanning tree of
    /// that depth.
    fn build_reachability(&mut self) -> io::Result<()> {
        let word_count = self.words.len();
        if word_count < 2 {
            return Ok(());
        }
        let levels = word_count - 1;
        let mut reachable: Vec<HashMap<(usize, usize), isize>> = vec![HashMap::new(); levels];

        for i in 0..word_count {
            for j in i + 1..word_count {
                let key = self.pair_key(i, j);
                let v = match self.intersects.get(&key) {
                    Some(&v) => v,
                    None => self.fresh_false()?,
                };
                reachable[0].insert(key, v);
            }
        }

        for level in 1..levels {
            for i in 0..word_count {
                for j in i + 1..word_count {
                    let key = self.pair_key(i, j);
                    let mut dis = Vec::new();
                    for w in 0..word_count {
                        if w == i || w == j {
                            continue;
                        }
                        let Some(&ivar) = self.intersects.get(&self.pair_key(i, w)) else {
                            continue;
                        };
                        let prev = reachable[level - 1][&self.pair_key(w, j)];
                        let step = self.cnf.conjunction_witness(&[ivar, prev], None)?;
                        dis.push(step);
                    }
                    let v = if dis.is_empty() {
                        self.fresh_false()?
                    } else {
                        self.cnf.disjunction_witness(&dis, None)?
                    };
                    reachable[level].insert(key, v);
                }
            }
        }

        for i in 0..word_count {
            for j in i + 1..word_count {
                let key = self.pair_key(i, j);
                let dis: Vec<isize> = (0..levels).map(|l| reachable[l][&key]).collect();
                let any_reach = self.cnf.disjunction_witness(&dis, None)?;
                let both_used = self
                    .cnf
                    .conjunction_witness(&[self.used[i], self.used[j]], None)?;
                self.cnf.write_clause(&[-both_used, any_reach])?;
            }
        }
        Ok(())
    }

    /// `empty[r,c]` holds when a cell carries no word at all; at most
    /// `limit` of them may be true.
    fn cap_empty_cells(&mut self, limit: usize) -> io::Result<()> {
        let mut empty = Vec::with_capacity(self.rows * self.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                let e = self
                    .cnf
                    .conjunction_witness(&[-self.hvar[r][c], -self.vvar[r][c]], None)?;
                empty.push(e);
            }
        }
        at_most_n_true(self.cnf, empty, limit)
    }

    fn guard(
        cnf: &mut Cnf,
        witnesses: &HashMap<(usize, usize), Vec<isize>>,
        var: isize,
        key: (usize, usize),
    ) -> io::Result<()> {
        let mut clause = vec![-var];
        if let Some(ws) = witnesses.get(&key) {
            clause.extend(ws);
        }
        cnf.write_clause(&clause)
    }

    /// A cell variable may only be true if some placement justifies it;
    /// without these guards the solver could report packings tighter than
    /// the words actually placed. Cells no placement can reach get a bare
    /// forcing unit. The pos/stop guards are redundant with the placement
    /// implications and only emitted on request.
    fn guard_witnesses(&mut self, extra: bool) -> io::Result<()> {
        for r in 0..self.rows {
            for c in 0..self.cols {
                Self::guard(self.cnf, &self.hvar_witness, self.hvar[r][c], (r, c))?;
                Self::guard(self.cnf, &self.vvar_witness, self.vvar[r][c], (r, c))?;
            }
        }
        if extra {
            for r in 0..self.rows {
                for c in 0..self.cols {
                    Self::guard(self.cnf, &self.stop_witness, self.stop[r][c], (r, c))?;
                }
            }
            let letters = std::mem::take(&mut self.letters);
            for r in 0..self.rows {
                for c in 0..self.cols {
                    for &ch in &letters {
                        let var = self.pos[&(ch, r, c)];
                        let mut clause = vec![-var];
                        if let Some(ws) = self.pos_witness.get(&(ch, r, c)) {
                            clause.extend(ws);
                        }
                        self.cnf.write_clause(&clause)?;
                    }
                }
            }
            self.letters = letters;
        }
        Ok(())
    }

    /// Each absolute force becomes one clause over the placements inside
    /// the jitter window; any of them satisfies the force. Placements
    /// that don't exist are dropped, and a force with no surviving
    /// placement (including one naming an unknown word) leaves the empty
    /// clause, making the formula unsatisfiable.
    fn apply_forces(
        &mut self,
        forces: &HashMap<String, Anchor>,
        jitter: usize,
    ) -> io::Result<()> {
        let words = self.words;
        for (wi, word) in words.iter().enumerate() {
            let Some(anchor) = forces.get(word) else {
                continue;
            };
            let mut clause = Vec::new();
            let j = jitter as isize;
            for rj in -j..=j {
                for cj in -j..=j {
                    let row = anchor.row as isize + rj;
                    let col = anchor.col as isize + cj;
                    if row < 0 || col < 0 {
                        continue;
                    }
                    let candidate = Anchor {
                        orientation: anchor.orientation,
                        row: row as usize,
                        col: col as usize,
                    };
                    if let Some(&v) = self.placement_index[wi].get(&candidate) {
                        clause.push(v);
                    }
                }
            }
            self.cnf.write_clause(&clause)?;
        }

        let mut unknown: Vec<&String> = forces
            .keys()
            .filter(|word| !words.contains(*word))
            .collect();
        unknown.sort();
        for _ in unknown {
            self.cnf.write_clause(&[])?;
        }
        Ok(())
    }

    /// Ties every placement of the first word to the partner placement of
    /// the second implied by the crossing offsets; placements with no
    /// partner are forbidden outright.
    fn apply_relative_forces(&mut self, relforces: &[RelativeForce]) -> io::Result<()> {
        for rf in relforces {
            let Some(wi1) = self.words.iter().position(|w| *w == rf.word1) else {
                continue;
            };
            let wi2 = self.words.iter().position(|w| *w == rf.word2);
            let entries = self.placements[wi1].clone();
            for (a1, v1) in entries {
                let partner = reloffset(a1, rf.offset1, rf.offset2);
                let resolved = match (partner, wi2) {
                    (Some(a2), Some(wj)) => self.placement_index[wj]
                        .get(&a2)
                        .copied()
                        .map(|v2| (a2, v2)),
                    _ => None,
                };
                match resolved {
                    Some((a2, v2)) => {
                        self.cnf.add_comment(format!(
                            "force: {} at {} <=> {} at {}",
                            rf.word1, a1, rf.word2, a2
                        ));
                        self.cnf.write_clause(&[-v1, v2])?;
                        self.cnf.write_clause(&[-v2, v1])?;
                    }
                    None => {
                        self.cnf
                            .add_comment(format!("force: {} can't be at {}", rf.word1, a1));
                        self.cnf.write_clause(&[-v1])?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// The cell where two placements cross, if they do: only H x V pairs can
/// intersect, the crossing cell must lie on both spans, and both words
/// must spell the same letter there.
fn intersection_cell(w1: &str, a1: Anchor, w2: &str, a2: Anchor) -> Option<(usize, usize)> {
    let (w1, a1, w2, a2) = if a1.orientation == Orientation::Vertical {
        (w2, a2, w1, a1)
    } else {
        (w1, a1, w2, a2)
    };
    if a1.orientation != Orientation::Horizontal || a2.orientation != Orientation::Vertical {
        return None;
    }
    let len1 = w1.chars().count();
    let len2 = w2.chars().count();
    if a2.col < a1.col || a2.col >= a1.col + len1 {
        return None;
    }
    if a1.row < a2.row || a1.row >= a2.row + len2 {
        return None;
    }
    let i1 = a2.col - a1.col;
    let i2 = a1.row - a2.row;
    if w1.chars().nth(i1) != w2.chars().nth(i2) {
        return None;
    }
    Some((a1.row, a2.col))
}

/// Partner anchor implied by a relative force: the crossing sits at the
/// `p1`-th letter of the anchored word and the `p2`-th letter of the
/// partner, so the partner runs perpendicular, offset accordingly.
fn reloffset(anchor: Anchor, p1: usize, p2: usize) -> Option<Anchor> {
    match anchor.orientation {
        Orientation::Horizontal => Some(Anchor {
            orientation: Orientation::Vertical,
            row: anchor.row.checked_sub(p2)?,
            col: anchor.col + p1,
        }),
        Orientation::Vertical => Some(Anchor {
            orientation: Orientation::Horizontal,
            row: anchor.row + p1,
            col: anchor.col.checked_sub(p2)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use varisat::{ExtendFormula, Lit, Solver};

    use super::*;
    use crate::decode;

    fn wordcross(words: &[&str], rows: usize, cols: usize) -> Wordcross {
        Wordcross::new(words.iter().map(|w| w.to_string()).collect(), rows, cols).unwrap()
    }

    fn encode_text(puzzle: &Wordcross, opts: &EncodeOptions) -> String {
        let mut cnf = Cnf::new().unwrap();
        generate_clauses(&mut cnf, puzzle, opts).unwrap();
        let mut out = Vec::new();
        cnf.emit(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn clauses_of(text: &str) -> Vec<Vec<isize>> {
        text.lines()
            .filter(|l| !l.starts_with('c') && !l.starts_with('p') && !l.trim().is_empty())
            .map(|l| {
                l.split_whitespace()
                    .map(|tok| tok.parse::<isize>().unwrap())
                    .take_while(|&x| x != 0)
                    .collect()
            })
            .collect()
    }

    fn solve(text: &str) -> Option<Vec<Lit>> {
        let mut solver = Solver::new();
        for clause in clauses_of(text) {
            let lits: Vec<Lit> = clause.iter().map(|&l| Lit::from_dimacs(l)).collect();
            solver.add_clause(&lits);
        }
        if solver.solve().unwrap() {
            Some(solver.model().unwrap())
        } else {
            None
        }
    }

    fn solution_line(model: &[Lit]) -> String {
        let mut line = String::from("v");
        for lit in model {
            let dimacs = lit.var().to_dimacs();
            line.push(' ');
            line.push_str(&(if lit.is_positive() { dimacs } else { -dimacs }).to_string());
        }
        line.push_str(" 0");
        line
    }

    fn decode_model(text: &str, model: &[Lit], rows: usize, cols: usize) -> String {
        let board = decode::decode_board(text, &solution_line(model), rows, cols).unwrap();
        board.to_string()
    }

    #[test]
    fn test_literals_stay_in_bounds() {
        let puzzle = wordcross(&["CAT", "CAR"], 3, 3);
        let opts = EncodeOptions { extra: true, empty: Some(5), ..Default::default() };
        let text = encode_text(&puzzle, &opts);
        let header = text
            .lines()
            .find(|l| l.starts_with("p cnf"))
            .unwrap()
            .split_whitespace()
            .skip(2)
            .map(|tok| tok.parse::<usize>().unwrap())
            .collect::<Vec<_>>();
        let (num_vars, num_clauses) = (header[0], header[1]);
        let clauses = clauses_of(&text);
        assert_eq!(clauses.len(), num_clauses);
        for clause in &clauses {
            for &lit in clause {
                assert!(lit != 0 && lit.unsigned_abs() <= num_vars);
            }
        }
    }

    #[test]
    fn test_single_word_fits_one_row() {
        let puzzle = wordcross(&["CAT"], 1, 3);
        let text = encode_text(&puzzle, &EncodeOptions::default());
        let model = solve(&text).expect("CAT should fit on a 1x3 grid");
        assert_eq!(decode_model(&text, &model, 1, 3), "CAT\n");
    }

    #[test]
    fn test_disjoint_words_cannot_connect() {
        // No shared letter, hence no intersection, hence no connectivity.
        let puzzle = wordcross(&["CAT", "DOG"], 3, 3);
        let text = encode_text(&puzzle, &EncodeOptions::default());
        assert!(solve(&text).is_none());
    }

    #[test]
    fn test_single_row_cannot_cross_two_words() {
        let puzzle = wordcross(&["CAT", "CAR"], 1, 5);
        let text = encode_text(&puzzle, &EncodeOptions::default());
        assert!(solve(&text).is_none());
    }

    #[test]
    fn test_crossing_pair_is_satisfiable() {
        let puzzle = wordcross(&["CAT", "CAR"], 3, 3);
        let text = encode_text(&puzzle, &EncodeOptions::default());
        let model = solve(&text).expect("CAT and CAR cross on a 3x3 grid");

        let placements = decode::placements_from_comments(&text);
        let chosen: Vec<_> = model
            .iter()
            .filter(|lit| lit.is_positive())
            .filter_map(|lit| placements.get(&lit.var().to_dimacs()))
            .collect();
        assert_eq!(chosen.len(), 2);
        let orientations: Vec<Orientation> =
            chosen.iter().map(|p| p.anchor.orientation).collect();
        assert!(orientations.contains(&Orientation::Horizontal));
        assert!(orientations.contains(&Orientation::Vertical));
    }

    #[test]
    fn test_lowerbound_allows_dropping_a_word() {
        let puzzle = wordcross(&["AB", "BC", "CA"], 3, 3);
        let opts = EncodeOptions { lowerbound: Some(2), ..Default::default() };
        let text = encode_text(&puzzle, &opts);
        let model = solve(&text).expect("two of the three words fit connected");

        let placements = decode::placements_from_comments(&text);
        let placed = model
            .iter()
            .filter(|lit| lit.is_positive())
            .filter(|lit| placements.contains_key(&lit.var().to_dimacs()))
            .count();
        assert!(placed >= 2);
    }

    #[test]
    fn test_hello_world_cross_at_shared_letter() {
        let puzzle = wordcross(&["HELLO", "WORLD"], 5, 5);
        let text = encode_text(&puzzle, &EncodeOptions::default());
        let model = solve(&text).expect("HELLO and WORLD share L and O");
        let board = decode_model(&text, &model, 5, 5);
        assert!(board.lines().any(|row| row.contains("HELLO")));
    }

    #[test]
    fn test_lowerbound_above_word_count_is_rejected() {
        let puzzle = wordcross(&["CAT"], 3, 3);
        let opts = EncodeOptions { lowerbound: Some(2), ..Default::default() };
        let mut cnf = Cnf::new().unwrap();
        let err = generate_clauses(&mut cnf, &puzzle, &opts).unwrap_err();
        assert!(matches!(err, PuzzleError::LowerBoundTooLarge { bound: 2, words: 1 }));
        assert_eq!(cnf.num_clauses(), 0);
    }

    #[test]
    fn test_square_grid_pins_first_word_horizontal() {
        let placements = decode::placements_from_comments(&encode_text(
            &wordcross(&["CAT", "CAR"], 3, 3),
            &EncodeOptions::default(),
        ));
        assert!(
            placements
                .values()
                .filter(|p| p.word == "CAT")
                .all(|p| p.anchor.orientation == Orientation::Horizontal)
        );
        assert!(
            placements
                .values()
                .any(|p| p.word == "CAR" && p.anchor.orientation == Orientation::Vertical)
        );

        // Rectangular grids keep both orientations for the first word.
        let placements = decode::placements_from_comments(&encode_text(
            &wordcross(&["CAT", "CAR"], 3, 4),
            &EncodeOptions::default(),
        ));
        assert!(
            placements
                .values()
                .any(|p| p.word == "CAT" && p.anchor.orientation == Orientation::Vertical)
        );
    }

    #[test]
    fn test_empty_cap_respects_witness_guards() {
        // One 2-letter word can't occupy a 3x3 grid, and the witness
        // guards keep the solver from faking occupancy on bare cells.
        let puzzle = wordcross(&["AB"], 3, 3);
        let opts = EncodeOptions { empty: Some(0), ..Default::default() };
        assert!(solve(&encode_text(&puzzle, &opts)).is_none());

        // On a 1x2 grid the word covers everything.
        let puzzle = wordcross(&["AB"], 1, 2);
        let opts = EncodeOptions { empty: Some(0), ..Default::default() };
        assert!(solve(&encode_text(&puzzle, &opts)).is_some());
    }

    #[test]
    fn test_absolute_force_pins_placement() {
        let puzzle = wordcross(&["CAT"], 1, 5);
        let opts = EncodeOptions {
            forces: HashMap::from([(
                "CAT".to_string(),
                Anchor { orientation: Orientation::Horizontal, row: 0, col: 2 },
            )]),
            ..Default::default()
        };
        let text = encode_text(&puzzle, &opts);
        let model = solve(&text).expect("forced anchor exists");
        assert_eq!(decode_model(&text, &model, 1, 5), "  CAT\n");
    }

    #[test]
    fn test_unplaceable_force_without_jitter_is_unsat() {
        // CAT's horizontal anchors on 1x5 end at column 2.
        let force = HashMap::from([(
            "CAT".to_string(),
            Anchor { orientation: Orientation::Horizontal, row: 0, col: 4 },
        )]);
        let puzzle = wordcross(&["CAT"], 1, 5);
        let opts = EncodeOptions { forces: force.clone(), ..Default::default() };
        assert!(solve(&encode_text(&puzzle, &opts)).is_none());

        // Jitter widens the window until a real placement falls inside.
        let opts = EncodeOptions { forces: force, jitter: 2, ..Default::default() };
        assert!(solve(&encode_text(&puzzle, &opts)).is_some());
    }

    #[test]
    fn test_relative_force_fixes_crossing() {
        // CAT and CAR crossing at their shared first letter.
        let puzzle = wordcross(&["CAT", "CAR"], 3, 3);
        let opts = EncodeOptions {
            relative_forces: vec![RelativeForce {
                word1: "CAT".to_string(),
                offset1: 0,
                word2: "CAR".to_string(),
                offset2: 0,
            }],
            ..Default::default()
        };
        let text = encode_text(&puzzle, &opts);
        let model = solve(&text).expect("crossing at C is feasible");

        let placements = decode::placements_from_comments(&text);
        let chosen: HashMap<&str, Anchor> = model
            .iter()
            .filter(|lit| lit.is_positive())
            .filter_map(|lit| placements.get(&lit.var().to_dimacs()))
            .map(|p| (p.word.as_str(), p.anchor))
            .collect();
        let cat = chosen["CAT"];
        let car = chosen["CAR"];
        assert_eq!(cat.orientation, Orientation::Horizontal);
        assert_eq!(car.orientation, Orientation::Vertical);
        assert_eq!((car.row, car.col), (cat.row, cat.col));
    }

    #[test]
    fn test_intersection_cell_geometry() {
        let h = |row, col| Anchor { orientation: Orientation::Horizontal, row, col };
        let v = |row, col| Anchor { orientation: Orientation::Vertical, row, col };

        // HELLO at H(3,0) meets WORLD at V(0,2) on the shared L.
        assert_eq!(intersection_cell("HELLO", h(3, 0), "WORLD", v(0, 2)), Some((3, 2)));
        // Argument order doesn't matter.
        assert_eq!(intersection_cell("WORLD", v(0, 2), "HELLO", h(3, 0)), Some((3, 2)));
        // Same orientation never intersects.
        assert_eq!(intersection_cell("HELLO", h(0, 0), "WORLD", h(1, 0)), None);
        // Crossing cell with disagreeing letters.
        assert_eq!(intersection_cell("HELLO", h(3, 0), "WORLD", v(0, 0)), None);
        // Spans that don't overlap.
        assert_eq!(intersection_cell("CAT", h(0, 0), "CAR", v(1, 1)), None);
    }

    #[test]
    fn test_reloffset_mapping() {
        let h = Anchor { orientation: Orientation::Horizontal, row: 2, col: 1 };
        assert_eq!(
            reloffset(h, 2, 1),
            Some(Anchor { orientation: Orientation::Vertical, row: 1, col: 3 })
        );
        let v = Anchor { orientation: Orientation::Vertical, row: 1, col: 3 };
        assert_eq!(
            reloffset(v, 1, 2),
            Some(Anchor { orientation: Orientation::Horizontal, row: 2, col: 1 })
        );
        // Offsets that would push the partner off the grid.
        let origin = Anchor { orientation: Orientation::Horizontal, row: 0, col: 0 };
        assert_eq!(reloffset(origin, 0, 1), None);
    }

    #[test]
    fn test_placement_witnesses_cover_every_cell() {
        // Every placement implies hvar on each spanned cell, and the guard
        // clause for that cell lists the placement back.
        let text = encode_text(&wordcross(&["AB"], 1, 2), &EncodeOptions::default());
        let placements = decode::placements_from_comments(&text);
        assert_eq!(placements.len(), 1);
        let &place_var = placements.keys().next().unwrap();
        let clauses = clauses_of(&text);
        // Guards have the shape (-x, place_var); one per spanned cell.
        let guards = clauses
            .iter()
            .filter(|c| c.len() == 2 && c[0] < 0 && c[1] == place_var)
            .count();
        assert!(guards >= 2);
    }
}
