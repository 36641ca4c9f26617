use std::process::ExitCode;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use rollsim_core::SimError;
use rollsim_sim::{ConfigError, Preset, RunSummary, ScenarioConfig};

const USAGE: &str = "usage: rollsim-runner [SCENARIO.toml | --preset NAME] [--out FILE]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: Option<String>,
    preset: Option<String>,
    out: Option<String>,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if let Some(name) = arg.strip_prefix("--preset=") {
            parsed.preset = Some(name.to_string());
        } else if let Some(path) = arg.strip_prefix("--out=") {
            parsed.out = Some(path.to_string());
        } else if arg == "--preset" {
            parsed.preset = Some(args.next().ok_or("--preset needs a preset name")?);
        } else if arg == "--out" {
            parsed.out = Some(args.next().ok_or("--out needs a file path")?);
        } else if arg == "--help" || arg == "-h" {
            parsed.help = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else if parsed.scenario.replace(arg).is_some() {
            return Err("only one scenario file may be given".to_string());
        }
    }
    if parsed.scenario.is_some() && parsed.preset.is_some() {
        return Err("give either a scenario file or --preset, not both".to_string());
    }
    Ok(parsed)
}

#[derive(Debug)]
enum RunnerError {
    Usage(String),
    Config(ConfigError),
    Sim(SimError),
    Output(String),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(m) => write!(f, "{m}\n{USAGE}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Sim(e) => write!(f, "simulation failed: {e}"),
            Self::Output(m) => write!(f, "failed to write results: {m}"),
        }
    }
}

impl From<ConfigError> for RunnerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SimError> for RunnerError {
    fn from(e: SimError) -> Self {
        Self::Sim(e)
    }
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig, RunnerError> {
    let mut config = match (&args.scenario, &args.preset) {
        (Some(path), _) => ScenarioConfig::load(path)?,
        (None, Some(name)) => {
            let mut config = ScenarioConfig::preset(name.parse::<Preset>()?);
            config.apply_env_overrides();
            config
        },
        (None, None) => {
            tracing::info!("no scenario given, using the incline preset");
            ScenarioConfig::preset(Preset::Incline)
        },
    };
    if args.out.is_some() {
        config.output.clone_from(&args.out);
    }
    config.validate()?;
    Ok(config)
}

/// Run the scenario and build its JSON report. One ball runs the
/// single-ball integrator with rest detection; more run them together.
fn run_scenario(config: &ScenarioConfig) -> Result<serde_json::Value, RunnerError> {
    if config.balls.len() == 1 {
        let mut sim = config.build_single()?;
        let outcome = sim.run(&config.walls, config.restitution)?;
        let results = sim.get_results();
        let summary = RunSummary::from_results(&results);
        tracing::info!(
            scenario = %config.name,
            ?outcome,
            samples = summary.samples,
            max_speed = summary.max_speed,
            slip_fraction = summary.slip_fraction,
            "scenario finished"
        );

        Ok(json!({
            "scenario": config.name,
            "outcome": outcome,
            "summary": summary,
            "energy_conserved": sim.check_energy_conservation(rollsim_sim::DEFAULT_TOLERANCE),
            "angular_momentum_conserved":
                sim.check_angular_momentum_conservation(rollsim_sim::DEFAULT_TOLERANCE),
            "results": results,
        }))
    } else {
        let mut sim = config.build_multi()?;
        let outcome = sim.run(&config.walls, config.restitution)?;
        let results = sim.get_results();
        let summaries: Vec<RunSummary> = results
            .balls
            .iter()
            .map(|track| RunSummary::from_track(&results.time, track))
            .collect();
        for (i, summary) in summaries.iter().enumerate() {
            tracing::info!(
                scenario = %config.name,
                ball = i,
                samples = summary.samples,
                max_speed = summary.max_speed,
                path_length = summary.path_length,
                "ball finished"
            );
        }

        Ok(json!({
            "scenario": config.name,
            "outcome": outcome,
            "summaries": summaries,
            "results": results,
        }))
    }
}

fn write_report(report: &serde_json::Value, out: Option<&str>) -> Result<(), RunnerError> {
    let text =
        serde_json::to_string_pretty(report).map_err(|e| RunnerError::Output(e.to_string()))?;
    match out {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| RunnerError::Output(format!("{path}: {e}")))?;
            tracing::info!(path, "results written");
        },
        None => println!("{text}"),
    }
    Ok(())
}

fn run() -> Result<(), RunnerError> {
    let args = parse_args(std::env::args().skip(1)).map_err(RunnerError::Usage)?;
    if args.help {
        println!("{USAGE}\npresets: {}", Preset::NAMES.join(", "));
        return Ok(());
    }

    let config = load_scenario(&args)?;
    let report = run_scenario(&config)?;
    write_report(&report, config.output.as_deref())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}
