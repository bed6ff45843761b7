//! Cardinality constraints built from pairwise sorting networks.
//!
//! Comparator gadgets sort a window of variables by substitution: each
//! comparator allocates a fresh (max, min) pair and rewrites the slots, so
//! after a network runs, the head of the slot vector holds a descending
//! sort of the original values. "Exactly n", "at most n" and "at least n"
//! select the top n+1 values batch by batch and then pin how many of those
//! may be false. Clause count stays near-linear in the input size for
//! modest n, which matters once placement variables number in the
//! thousands.
//!
//! See also: Batcher, "Sorting networks and their applications", 1968.

use std::io;

use itertools::Itertools;

use crate::cnf::Cnf;

/// Emits a comparator on `slots[i]` and `slots[j]`: two fresh variables
/// constrained to the max (disjunction) and min (conjunction) of the two
/// inputs, which then replace the slots in descending order.
fn apply_comparator(cnf: &mut Cnf, slots: &mut [isize], i: usize, j: usize) -> io::Result<()> {
    let (a, b) = (slots[i], slots[j]);
    let minv = cnf.new_var();
    let maxv = cnf.new_var();
    cnf.write_clause(&[-maxv, a, b])?;
    cnf.write_clause(&[-a, maxv])?;
    cnf.write_clause(&[-b, maxv])?;
    cnf.write_clause(&[minv, -a, -b])?;
    cnf.write_clause(&[a, -minv])?;
    cnf.write_clause(&[b, -minv])?;
    slots[i] = maxv;
    slots[j] = minv;
    Ok(())
}

/// Sorts `slots[begin..end]` descending by comparator substitution.
///
/// The comparator index sequence is Batcher's pairwise schedule: doubling
/// merge phases followed by an interleaved cleanup. It depends only on
/// `end - begin`, never on the slot contents.
pub fn pairwise_sorting_network(
    cnf: &mut Cnf,
    slots: &mut [isize],
    begin: usize,
    end: usize,
) -> io::Result<()> {
    let n = end - begin;
    let mut a = 1;
    while a < n {
        let mut b = a;
        let mut c = 0;
        while b < n {
            apply_comparator(cnf, slots, begin + b - a, begin + b)?;
            b += 1;
            c = (c + 1) % a;
            if c == 0 {
                b += a;
            }
        }
        a *= 2;
    }

    a /= 4;
    let mut e = 1;
    while a > 0 {
        let mut d = e;
        while d > 0 {
            let mut b = (d + 1) * a;
            let mut c = 0;
            while b < n {
                apply_comparator(cnf, slots, begin + b - d * a, begin + b)?;
                b += 1;
                c = (c + 1) % a;
                if c == 0 {
                    b += a;
                }
            }
            d /= 2;
        }
        a /= 2;
        e = e * 2 + 1;
    }
    Ok(())
}

/// Merges the sorted window starting at `j` into the sorted window starting
/// at `i`: pairs `slots[i+k]` with `slots[j+n-1-k]`, a reversed zip that
/// leaves the top `n` values in the first window.
fn filter_network(
    cnf: &mut Cnf,
    slots: &mut [isize],
    i: usize,
    j: usize,
    n: usize,
) -> io::Result<()> {
    for k in 0..n {
        apply_comparator(cnf, slots, i + k, j + n - 1 - k)?;
    }
    Ok(())
}

/// Asserts that exactly `n` of the variables are true.
pub fn exactly_n_true(cnf: &mut Cnf, vars: Vec<isize>, n: usize) -> io::Result<()> {
    n_true(cnf, vars, n, true, true)
}

/// Asserts that at most `n` of the variables are true.
pub fn at_most_n_true(cnf: &mut Cnf, vars: Vec<isize>, n: usize) -> io::Result<()> {
    n_true(cnf, vars, n, true, false)
}

/// Asserts that at least `n` of the variables are true.
pub fn at_least_n_true(cnf: &mut Cnf, vars: Vec<isize>, n: usize) -> io::Result<()> {
    n_true(cnf, vars, n, false, true)
}

fn n_true(
    cnf: &mut Cnf,
    mut slots: Vec<isize>,
    n: usize,
    at_most: bool,
    at_least: bool,
) -> io::Result<()> {
    if n == 0 {
        if at_most {
            for &v in &slots {
                cnf.write_clause(&[-v])?;
            }
        }
        return Ok(());
    }
    if n >= slots.len() {
        // Too few variables for the network; the bound degenerates.
        if at_least {
            if n > slots.len() {
                cnf.write_clause(&[])?;
            } else {
                for &v in &slots {
                    cnf.write_clause(&[v])?;
                }
            }
        }
        return Ok(());
    }

    // Select the top n+1 values into the head window, then constrain how
    // many of those may be false.
    let n = n + 1;
    let batches = slots.len() / n;
    for b in 1..batches {
        pairwise_sorting_network(cnf, &mut slots, 0, n)?;
        pairwise_sorting_network(cnf, &mut slots, b * n, (b + 1) * n)?;
        filter_network(cnf, &mut slots, 0, b * n, n)?;
    }
    let rem = slots.len() - batches * n;
    if rem > 0 {
        pairwise_sorting_network(cnf, &mut slots, 0, n)?;
        let len = slots.len();
        pairwise_sorting_network(cnf, &mut slots, batches * n, len)?;
        filter_network(cnf, &mut slots, n - rem, batches * n, rem)?;
    }

    if at_least {
        at_most_one_false(cnf, &slots[..n])?;
    }
    if at_most {
        let clause: Vec<isize> = slots[..n].iter().map(|&v| -v).collect();
        cnf.write_clause(&clause)?;
    }
    Ok(())
}

/// Asserts that at most one of the variables is true (pairwise).
pub fn at_most_one_true(cnf: &mut Cnf, vars: &[isize]) -> io::Result<()> {
    for (&x, &y) in vars.iter().tuple_combinations() {
        cnf.write_clause(&[-x, -y])?;
    }
    Ok(())
}

/// Asserts that at most one of the variables is false (pairwise).
fn at_most_one_false(cnf: &mut Cnf, vars: &[isize]) -> io::Result<()> {
    for (&x, &y) in vars.iter().tuple_combinations() {
        cnf.write_clause(&[x, y])?;
    }
    Ok(())
}

/// Asserts that exactly one of the variables is true: one clause for the
/// disjunction plus the pairwise at-most-one clauses.
pub fn exactly_one_true(cnf: &mut Cnf, vars: &[isize]) -> io::Result<()> {
    cnf.write_clause(vars)?;
    at_most_one_true(cnf, vars)
}
