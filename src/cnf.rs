use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};

/// A CNF formula under construction.
///
/// Owns the variable counter, the clause counter and the comment list, and
/// appends clauses to a disk-backed scratch file as they are emitted. The
/// scratch keeps peak memory proportional to the encoder's variable tables
/// rather than to the clause stream; [`Cnf::emit`] replays it once behind
/// the `p cnf V C` header, which is only known at the end.
pub struct Cnf {
    scratch: BufWriter<File>,
    num_vars: usize,
    num_clauses: usize,
    comments: Vec<String>,
}

impl Cnf {
    pub fn new() -> io::Result<Self> {
        Ok(Cnf {
            scratch: BufWriter::new(tempfile::tempfile()?),
            num_vars: 0,
            num_clauses: 0,
            comments: Vec::new(),
        })
    }

    /// Allocates a fresh variable. IDs are 1-based, as in DIMACS.
    pub fn new_var(&mut self) -> isize {
        self.num_vars += 1;
        self.num_vars as isize
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.num_clauses
    }

    /// Appends one clause to the formula. The empty clause is legal and
    /// makes the formula unsatisfiable; it is written out like any other.
    pub fn write_clause(&mut self, literals: &[isize]) -> io::Result<()> {
        for literal in literals {
            write!(self.scratch, "{literal} ")?;
        }
        writeln!(self.scratch, "0")?;
        self.num_clauses += 1;
        Ok(())
    }

    /// Records a comment to be emitted before the problem line.
    pub fn add_comment(&mut self, text: impl Into<String>) {
        self.comments.push(text.into());
    }

    /// Makes `v` true iff the disjunction of the literals in `d` is true.
    ///
    /// Allocates `v` unless the caller supplies a pre-allocated slot.
    /// Emits `|d| + 1` clauses. An empty `d` forces `v` false.
    pub fn disjunction_witness(&mut self, d: &[isize], v: Option<isize>) -> io::Result<isize> {
        let v = match v {
            Some(v) => v,
            None => self.new_var(),
        };
        let mut clause: Vec<isize> = d.to_vec();
        clause.push(-v);
        self.write_clause(&clause)?;
        for &dv in d {
            self.write_clause(&[v, -dv])?;
        }
        Ok(v)
    }

    /// Makes `v` true iff the conjunction of the literals in `c` is true.
    ///
    /// Dual of [`Cnf::disjunction_witness`]. An empty `c` forces `v` true.
    pub fn conjunction_witness(&mut self, c: &[isize], v: Option<isize>) -> io::Result<isize> {
        let v = match v {
            Some(v) => v,
            None => self.new_var(),
        };
        let mut clause: Vec<isize> = c.iter().map(|&cv| -cv).collect();
        clause.push(v);
        self.write_clause(&clause)?;
        for &cv in c {
            self.write_clause(&[-v, cv])?;
        }
        Ok(v)
    }

    /// Writes the finished formula: comments, the `p cnf V C` problem line,
    /// the clause body, and a trailing newline.
    pub fn emit<W: Write>(self, out: &mut W) -> io::Result<()> {
        let Cnf {
            scratch,
            num_vars,
            num_clauses,
            comments,
        } = self;
        for comment in &comments {
            writeln!(out, "c {comment}")?;
        }
        writeln!(out, "p cnf {num_vars} {num_clauses}")?;
        let mut file = scratch.into_inner().map_err(|e| e.into_error())?;
        file.seek(SeekFrom::Start(0))?;
        io::copy(&mut file, out)?;
        writeln!(out)?;
        Ok(())
    }
}
