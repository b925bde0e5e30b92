//! u-eqsearch: find variable values that satisfy an equation.
//!
//! # Usage
//!
//! ```bash
//! u-eqsearch "2*a + 3*b = 7"
//! u-eqsearch "a^2 - 2 = 0" --min 0 --max 2 --precision 4 --seed 42
//! RUST_LOG=debug u-eqsearch "1/a + b = 3" --generations 50
//! ```

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::info;

use u_eqsearch::ga::{GaConfig, GaRunner, Selection};
use u_eqsearch::search::{EquationChromosome, Residual, SearchConfig, SearchSpace};
use u_eqsearch::Error;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Evolutionary equation solver.
#[derive(Parser, Debug)]
#[command(name = "u-eqsearch", version)]
#[command(about = "Search for variable values that satisfy an equation")]
struct Cli {
    /// Equation to solve, e.g. "2*a + 3*b = 7". A missing right-hand side
    /// means "= 0".
    #[arg(allow_hyphen_values = true)]
    equation: String,

    /// Smallest generated value.
    #[arg(long, default_value_t = -50.0, allow_hyphen_values = true)]
    min: f64,

    /// Largest generated value.
    #[arg(long, default_value_t = 50.0, allow_hyphen_values = true)]
    max: f64,

    /// Decimal digits kept on generated floats.
    #[arg(long, default_value_t = 1)]
    precision: u32,

    /// Share of generated values that are floats rather than integers.
    #[arg(long, default_value_t = 0.5)]
    float_ratio: f64,

    /// Integers never generated (repeatable).
    #[arg(long, default_values_t = vec![0], allow_hyphen_values = true)]
    exclude: Vec<i64>,

    /// Population size.
    #[arg(long, default_value_t = 5000)]
    population: usize,

    /// Maximum number of generations.
    #[arg(long, default_value_t = 200)]
    generations: usize,

    /// Probability that a parent pair is recombined.
    #[arg(long, default_value_t = 0.2)]
    crossover_rate: f64,

    /// Per-variable mutation probability.
    #[arg(long, default_value_t = 0.15)]
    mutation_rate: f64,

    /// Parent selection strategy.
    #[arg(long, value_enum, default_value_t = SelectionArg::Tournament)]
    selection: SelectionArg,

    /// Individuals per tournament.
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,

    /// Share of the population carried over unchanged.
    #[arg(long, default_value_t = 0.1)]
    elite_ratio: f64,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectionArg {
    Tournament,
    Roulette,
    Rank,
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            min: self.min,
            max: self.max,
            decimal_points: self.precision,
            float_ratio: self.float_ratio,
            excluded: self.exclude.clone(),
        }
    }

    fn ga_config(&self) -> GaConfig {
        let selection = match self.selection {
            SelectionArg::Tournament => Selection::Tournament(self.tournament_size),
            SelectionArg::Roulette => Selection::Roulette,
            SelectionArg::Rank => Selection::Rank,
        };
        // Raw assignment so out-of-range rates reach validate() unclamped.
        let mut config = GaConfig::default()
            .with_population_size(self.population)
            .with_max_generations(self.generations)
            .with_selection(selection);
        config.crossover_rate = self.crossover_rate;
        config.mutation_rate = self.mutation_rate;
        config.elite_ratio = self.elite_ratio;
        config.seed = self.seed;
        config.time_limit_ms = self.time_limit_ms;
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let space = SearchSpace::parse(&cli.equation, cli.search_config())?;
    let config = cli.ga_config();
    info!(
        "solving {} for {:?}",
        cli.equation,
        space.binding().variables()
    );

    let started = Instant::now();
    let result = GaRunner::run_with_observer::<EquationChromosome, _>(
        &space,
        &config,
        None,
        |stats| {
            if stats.improved {
                info!(
                    "generation {}: answer {} at {}",
                    stats.generation,
                    format_residual(stats.best.residual()),
                    stats.best.assignment()
                );
            }
        },
    )?;
    let elapsed = started.elapsed();

    let outcome = if result.solved {
        "solved"
    } else if result.cancelled || result.timed_out {
        "stopped"
    } else {
        "best effort"
    };
    println!("Result: {outcome}");
    println!("Generations: {}", result.generations);
    println!(
        "Combinations checked: {}",
        group_thousands(result.evaluated as u64)
    );
    println!("Elapsed: {:.3}s", elapsed.as_secs_f64());

    println!("Best answer: {}", format_residual(result.best.residual()));
    println!("Variables: {}", result.best.assignment());
    Ok(())
}

/// Residual at 16 significant digits, or `invalid`.
fn format_residual(residual: Residual) -> String {
    residual
        .value()
        .map_or_else(|| residual.to_string(), |r| to_significant(r, 16))
}

/// Formats an integer with `,` between groups of three digits.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats `v` with `digits` significant digits, switching to exponent
/// notation for very large or very small magnitudes.
fn to_significant(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let digits = digits.max(1);
    let exponent = v.abs().log10().floor() as i32;
    if exponent < -6 || exponent >= digits as i32 {
        return format!("{:.*e}", digits - 1, v);
    }
    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    format!("{v:.decimals$}")
}
