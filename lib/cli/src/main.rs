use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use elapsed::measure_time;
use itertools::Itertools;
use log::{info, warn};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use sat_portfolio::{ControlHandle, Session, SolverConfig};
use sat_portfolio_core::solver::Verdict;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Portfolio SAT solver")]
struct Cli {
    /// CNF file (plain or gzipped DIMACS)
    #[clap(parse(from_os_str), value_name = "FILE")]
    cnf: PathBuf,

    /// Number of portfolio members (-1 for all CPUs)
    #[clap(short, long, default_value = "1", allow_hyphen_values = true)]
    threads: isize,

    /// Base random seed
    #[clap(long, default_value = "0")]
    seed: u32,

    /// Time limit in seconds (0 for none)
    #[clap(long, default_value = "0", value_name = "SECS")]
    timeout: u64,

    /// Enable preprocessing in the members
    #[clap(long)]
    preprocess: bool,

    /// Verbosity level
    #[clap(short, long, default_value = "0")]
    verbosity: u32,

    /// Comma-separated assumption literals
    #[clap(long, value_name = "LITS", use_value_delimiter = true, allow_hyphen_values = true)]
    assume: Vec<i32>,

    /// Print the model
    #[clap(long)]
    model: bool,
}

impl Cli {
    fn config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_threads(self.threads)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_seed(self.seed)
            .with_preprocessing(self.preprocess)
            .with_verbosity(self.verbosity)
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    TermLogger::init(args.log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
    info!("args = {:?}", args);

    let verdict = run(&args)?;
    std::process::exit(verdict.code());
}

fn run(args: &Cli) -> color_eyre::Result<Verdict> {
    let config = args.config();
    let mut session = Session::new();
    session.configure(&config)?;
    info!("session = {}", session);
    session
        .load_dimacs(&args.cnf)
        .wrap_err_with(|| format!("Could not load '{}'", args.cnf.display()))?;
    info!("session = {}", session);

    let (done, watchdog) = match config.timeout() {
        Some(timeout) => {
            let (done, rx) = mpsc::channel::<()>();
            let control = session.control();
            let handle = thread::Builder::new()
                .name("watchdog".to_string())
                .spawn(move || watch(rx, control, timeout))?;
            (Some(done), Some(handle))
        }
        None => (None, None),
    };

    info!("Solving...");
    let (elapsed, verdict) = measure_time(|| session.solve_with_assumptions(&args.assume));
    info!("{} in {}", verdict, elapsed);

    drop(done);
    if let Some(handle) = watchdog {
        if handle.join().is_err() {
            warn!("Watchdog thread panicked");
        }
    }

    println!("s {}", status_line(verdict));
    if args.model && verdict == Verdict::Satisfiable {
        for line in model_lines(&session.model()?) {
            println!("{}", line);
        }
    }
    let report = session.statistics_report();
    for line in report.to_string().lines() {
        println!("c {}", line);
    }
    println!("c time: {}", elapsed);

    Ok(verdict)
}

/// Interrupt the session unless `done` is dropped before the timeout.
fn watch(done: mpsc::Receiver<()>, control: ControlHandle, timeout: Duration) {
    if let Err(mpsc::RecvTimeoutError::Timeout) = done.recv_timeout(timeout) {
        warn!("Timeout of {:?} reached, interrupting", timeout);
        control.interrupt();
    }
}

fn status_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Satisfiable => "SATISFIABLE",
        Verdict::Unsatisfiable => "UNSATISFIABLE",
        Verdict::Unknown => "UNKNOWN",
    }
}

/// Model in competition format: `v` lines of at most ten literals, terminated by `v 0`.
fn model_lines(model: &[i32]) -> Vec<String> {
    model
        .iter()
        .chunks(10)
        .into_iter()
        .map(|mut chunk| format!("v {}", chunk.join(" ")))
        .chain(std::iter::once("v 0".to_string()))
        .collect()
}
