// Cricket forecast entry point.
//
// Two modes share one config file (config.toml in the working directory):
//
//   cricket-forecast pipeline
//       Load the observations CSV, run the feature pipeline, persist the
//       engineered tables to the configured output directory.
//
//   cricket-forecast outcome <team_a> <team_b>
//   cricket-forecast runs <team>
//   cricket-forecast wickets <team>
//   cricket-forecast top <match> [n]
//       Load the persisted tables and the predictor artifacts, answer one
//       query, print the result as JSON on stdout.
//
// Query mode loads everything up front and fails at startup if any table
// or model artifact is missing or malformed; a "not found" answer is the
// only per-query failure.

use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use cricket_forecast::config::{self, Config};
use cricket_forecast::facade::QueryContext;
use cricket_forecast::pipeline;
use cricket_forecast::predictor;
use cricket_forecast::store;
use cricket_forecast::tables;

const CONFIG_PATH: &str = "config.toml";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("pipeline");

    let config =
        config::load_config(Path::new(CONFIG_PATH)).context("failed to load configuration")?;

    match mode {
        "pipeline" => run_pipeline(&config),
        "outcome" | "runs" | "wickets" | "top" => run_query(&config, mode, &args[1..]),
        other => bail!("unknown mode `{other}` (expected pipeline, outcome, runs, wickets, top)"),
    }
}

fn run_pipeline(config: &Config) -> anyhow::Result<()> {
    let observations = Path::new(&config.data.observations);
    let mut row_store =
        store::load_observations(observations).context("failed to load observations")?;
    info!(
        "loaded {} observation(s) from {}",
        row_store.len(),
        observations.display()
    );

    let engineered = pipeline::run(&mut row_store, config);

    let output_dir = Path::new(&config.data.output_dir);
    tables::write_all(&engineered, output_dir).context("failed to persist engineered tables")?;
    info!(
        "wrote {} feature row(s) and {} ranked player(s) to {}",
        engineered.features.len(),
        engineered.rankings.len(),
        output_dir.display()
    );
    Ok(())
}

fn run_query(config: &Config, mode: &str, args: &[String]) -> anyhow::Result<()> {
    let output_dir = Path::new(&config.data.output_dir);
    let engineered =
        tables::load_all(output_dir).context("failed to load engineered tables (run the pipeline first)")?;
    let predictors =
        predictor::load_predictors(&config.models).context("failed to load predictor artifacts")?;
    let context = QueryContext::new(engineered, predictors);

    let json = match mode {
        "outcome" => {
            let [team_a, team_b] = two_args(args, "outcome <team_a> <team_b>")?;
            serde_json::to_string_pretty(&context.predict_match_outcome(team_a, team_b)?)?
        }
        "runs" => {
            let team = one_arg(args, "runs <team>")?;
            serde_json::to_string_pretty(&context.predict_team_runs(team)?)?
        }
        "wickets" => {
            let team = one_arg(args, "wickets <team>")?;
            serde_json::to_string_pretty(&context.predict_team_wickets(team)?)?
        }
        "top" => {
            let match_id = args
                .first()
                .context("usage: top <match> [n]")?;
            let top_n = match args.get(1) {
                Some(n) => Some(n.parse::<usize>().context("top count must be a number")?),
                None => None,
            };
            serde_json::to_string_pretty(&context.top_fantasy_players(match_id, top_n)?)?
        }
        _ => unreachable!("mode checked by caller"),
    };

    println!("{json}");
    Ok(())
}

fn one_arg<'a>(args: &'a [String], usage: &str) -> anyhow::Result<&'a str> {
    match args {
        [a] => Ok(a.as_str()),
        _ => bail!("usage: {usage}"),
    }
}

fn two_args<'a>(args: &'a [String], usage: &str) -> anyhow::Result<[&'a str; 2]> {
    match args {
        [a, b] => Ok([a.as_str(), b.as_str()]),
        _ => bail!("usage: {usage}"),
    }
}

/// Log to stderr so stdout stays clean for query-mode JSON output.
fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cricket_forecast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // A second init (e.g. under test harnesses) is harmless.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
