use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use wordcross_sat::cnf::Cnf;
use wordcross_sat::decode;
use wordcross_sat::puzzle;
use wordcross_sat::wordcross_sat::{EncodeOptions, Wordcross, generate_clauses};

#[derive(Parser)]
#[command(author, version, about = "Encode wordcross puzzle synthesis as SAT")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a DIMACS CNF formula that is satisfiable iff the words
    /// form a connected wordcross on the grid; the formula goes to stdout
    Generate {
        /// input words, one per line
        wordfile: PathBuf,
        /// number of rows
        rows: usize,
        /// number of columns
        cols: usize,
        /// add some unnecessary clauses that may help the solver
        #[arg(long)]
        extra: bool,
        /// file containing forced placements
        #[arg(long, value_name = "FILE")]
        forcefile: Option<PathBuf>,
        /// jitter to apply to forced placements
        #[arg(long, default_value_t = 0)]
        jitter: usize,
        /// file containing relative forces
        #[arg(long, value_name = "FILE")]
        relforcefile: Option<PathBuf>,
        /// at least this many words must be placed (default: all)
        #[arg(long)]
        lowerbound: Option<usize>,
        /// force at most this many empty cells
        #[arg(long)]
        empty: Option<usize>,
    },
    /// Decode a SAT solver's output back into a grid
    Decode {
        /// the DIMACS file produced by generate
        cnf_file: PathBuf,
        /// the SAT solver's output
        solution_file: PathBuf,
        /// number of rows
        rows: usize,
        /// number of columns
        cols: usize,
        /// how to render the solution
        #[arg(long, value_enum, default_value = "ascii")]
        format: Format,
    },
    /// Print a clause that blocks the solved layout from recurring
    Block {
        /// the DIMACS file produced by generate
        cnf_file: PathBuf,
        /// the SAT solver's output
        solution_file: PathBuf,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug)]
enum Format {
    /// the filled grid
    Ascii,
    /// chosen placements, reusable as a force file
    Forces,
    /// relative forces between intersecting words
    Relative,
}

struct GenerateArgs {
    wordfile: PathBuf,
    rows: usize,
    cols: usize,
    extra: bool,
    forcefile: Option<PathBuf>,
    jitter: usize,
    relforcefile: Option<PathBuf>,
    lowerbound: Option<usize>,
    empty: Option<usize>,
}

fn read_input(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn generate(args: GenerateArgs) -> Result<()> {
    let words = puzzle::load_words(&args.wordfile)
        .with_context(|| format!("reading {}", args.wordfile.display()))?;
    let forces = match &args.forcefile {
        Some(path) => {
            puzzle::load_forces(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => HashMap::new(),
    };
    let relative_forces = match &args.relforcefile {
        Some(path) => puzzle::load_relative_forces(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => Vec::new(),
    };

    let puzzle = Wordcross::new(words, args.rows, args.cols)?;
    let opts = EncodeOptions {
        extra: args.extra,
        jitter: args.jitter,
        lowerbound: args.lowerbound,
        empty: args.empty,
        forces,
        relative_forces,
    };
    let mut cnf = Cnf::new()?;
    generate_clauses(&mut cnf, &puzzle, &opts)?;

    eprintln!(
        "Encoded {} words on a {}x{} grid ({} variables, {} clauses)",
        puzzle.words().len(),
        args.rows,
        args.cols,
        cnf.num_vars(),
        cnf.num_clauses()
    );
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    cnf.emit(&mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            wordfile,
            rows,
            cols,
            extra,
            forcefile,
            jitter,
            relforcefile,
            lowerbound,
            empty,
        } => generate(GenerateArgs {
            wordfile,
            rows,
            cols,
            extra,
            forcefile,
            jitter,
            relforcefile,
            lowerbound,
            empty,
        }),
        Commands::Decode {
            cnf_file,
            solution_file,
            rows,
            cols,
            format,
        } => {
            let cnf_text = read_input(&cnf_file)?;
            let solution_text = read_input(&solution_file)?;
            match format {
                Format::Ascii => {
                    let board = decode::decode_board(&cnf_text, &solution_text, rows, cols)?;
                    print!("{board}");
                }
                Format::Forces => {
                    for line in decode::force_lines(&cnf_text, &solution_text)? {
                        println!("{line}");
                    }
                }
                Format::Relative => {
                    for line in decode::relative_lines(&cnf_text, &solution_text)? {
                        println!("{line}");
                    }
                }
            }
            Ok(())
        }
        Commands::Block {
            cnf_file,
            solution_file,
        } => {
            let cnf_text = read_input(&cnf_file)?;
            let solution_text = read_input(&solution_file)?;
            println!("{}", decode::blocking_clause(&cnf_text, &solution_text)?);
            Ok(())
        }
    }
}
