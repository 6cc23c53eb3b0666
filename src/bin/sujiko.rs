use std::str::FromStr;
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use sujiko_dfs::puzzle::{Mode, Puzzle};
use sujiko_dfs::solver::{BacktrackSolver, SujikoChecker};

const USAGE: &str = "Usage: sujiko <puzzle-file> [--mode view|solve] [--json]";

struct Args {
    path: String,
    mode: Mode,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut path = None;
    let mut mode = Mode::Solve;
    let mut json = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                let value = args.next().ok_or_else(|| eyre!(USAGE))?;
                mode = Mode::from_str(&value)
                    .map_err(|_| eyre!("Unknown mode {:?}\n{}", value, USAGE))?;
            }
            "--json" => json = true,
            _ if path.is_none() => path = Some(arg),
            _ => bail!(USAGE),
        }
    }
    Ok(Args {
        path: path.ok_or_else(|| eyre!(USAGE))?,
        mode,
        json,
    })
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = parse_args()?;
    let text = std::fs::read_to_string(&args.path)
        .wrap_err_with(|| format!("Failed to read {}", args.path))?;
    let mut puzzle = Puzzle::parse(&text, args.path.as_str())
        .wrap_err_with(|| format!("Failed to parse {}", args.path))?;
    puzzle.set_mode(args.mode);
    match args.mode {
        Mode::View | Mode::Edit => {
            print!("{}", puzzle);
        }
        Mode::Solve => {
            let mut solver = BacktrackSolver::new(SujikoChecker);
            let solved = solver.solve(puzzle.grid_mut())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&solver.stats())?);
            }
            if solved {
                print!("{}", puzzle);
            } else {
                bail!("No solution exists from the given state");
            }
        }
    }
    Ok(())
}
