/// A library for encoding wordcross puzzle synthesis as SAT.
///
/// This crate translates "place these words on a rows x cols grid as a
/// single connected crossword-style figure" into a DIMACS CNF formula for
/// an external SAT solver, and decodes solver models back into grids.
pub mod cardinality;
pub mod cnf;
pub mod decode;
pub mod puzzle;
pub mod wordcross_sat;
