//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::csv_adapter::CsvCandleStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::{JsonStrategyStore, StoredStrategy};
use crate::adapters::regression_tree::RegressionTree;
use crate::domain::backtest::{align_test_days, dry_run};
use crate::domain::error::PairtraderError;
use crate::domain::features::FeatureTransformer;
use crate::domain::instrument::Instrument;
use crate::domain::search::{self, SearchGrid, evaluate, split_dataset};
use crate::domain::simulator::TradeControls;
use crate::domain::sizing::UnitShape;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::CandleSource;
use crate::ports::model_port::{ModelParams, PredictiveModel};

#[derive(Parser, Debug)]
#[command(name = "pairtrader", about = "Single-instrument strategy search and backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the parameter grid and store the best strategy
    Search {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        instrument: Option<String>,
    },
    /// Replay a stored strategy over its test window
    DryRun {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        instrument: Option<String>,
    },
    /// Show candle coverage and stored strategies
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Search { config, instrument } => run_search(&config, instrument.as_deref()),
        Command::DryRun { config, instrument } => run_dry_run(&config, instrument.as_deref()),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PairtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn candle_store(config: &dyn ConfigPort) -> Result<CsvCandleStore, PairtraderError> {
    let store = config
        .get_string("data", "store")
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "data".into(),
            key: "store".into(),
        })?;
    Ok(CsvCandleStore::new(PathBuf::from(store)))
}

fn strategy_store(config: &dyn ConfigPort) -> Result<JsonStrategyStore, PairtraderError> {
    let store = config
        .get_string("strategy", "store")
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "strategy".into(),
            key: "store".into(),
        })?;
    Ok(JsonStrategyStore::new(PathBuf::from(store)))
}

/// Instruments to process: a CLI override beats the configured list.
pub fn resolve_instruments(
    instrument_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<Instrument>, PairtraderError> {
    if let Some(name) = instrument_override {
        return Ok(vec![Instrument::new(name.to_uppercase())]);
    }

    let listed = config
        .get_string("data", "instruments")
        .ok_or_else(|| PairtraderError::ConfigMissing {
            section: "data".into(),
            key: "instruments".into(),
        })?;

    let instruments: Vec<Instrument> = listed
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .map(Instrument::new)
        .collect();

    if instruments.is_empty() {
        return Err(PairtraderError::ConfigInvalid {
            section: "data".into(),
            key: "instruments".into(),
            reason: "no instruments listed".into(),
        });
    }
    Ok(instruments)
}

fn parse_number_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> Result<Vec<f64>, PairtraderError> {
    let raw = config
        .get_string(section, key)
        .unwrap_or_else(|| default.to_string());

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| PairtraderError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("{s:?} is not a number"),
            })
        })
        .collect()
}

/// Assemble the search grid from the `[search]` section, falling back
/// to the default sweep for anything unset.
pub fn build_grid(config: &dyn ConfigPort) -> Result<SearchGrid, PairtraderError> {
    let max_depths = parse_number_list(config, "search", "max_depths", "4, 6, 8, 10")?;
    let min_splits =
        parse_number_list(config, "search", "min_samples_splits", "2, 6, 10, 14, 18")?;

    let mut model_space = Vec::with_capacity(max_depths.len() * min_splits.len());
    for &depth in &max_depths {
        for &split in &min_splits {
            let mut params = ModelParams::new();
            params.insert("max_depth".into(), depth);
            params.insert("min_samples_split".into(), split);
            model_space.push(params);
        }
    }

    let thresholds = parse_number_list(config, "search", "thresholds", "40, 60, 80, 100")?;

    let shapes_raw = config
        .get_string("search", "unit_shapes")
        .unwrap_or_else(|| "constant, linear, quadratic, root".to_string());
    let mut shapes = Vec::new();
    for name in shapes_raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        shapes.push(UnitShape::from_str(&name.to_lowercase())?);
    }
    if shapes.is_empty() {
        return Err(PairtraderError::ConfigInvalid {
            section: "search".into(),
            key: "unit_shapes".into(),
            reason: "no unit shapes listed".into(),
        });
    }

    let trailing_stop = config
        .get_string("search", "trailing_stop")
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| PairtraderError::ConfigInvalid {
                    section: "search".into(),
                    key: "trailing_stop".into(),
                    reason: format!("{s:?} is not a number"),
                })
        })
        .transpose()?;
    let controls = TradeControls {
        trailing_stop,
        ..TradeControls::NONE
    };

    let mut strategy_space = Vec::with_capacity(thresholds.len() * shapes.len());
    for &threshold in &thresholds {
        for &shape in &shapes {
            strategy_space.push(StrategyParams::new(threshold, shape).with_controls(controls));
        }
    }

    let split_ratio = config.get_double("search", "split_ratio", 0.8);
    if !(split_ratio > 0.0 && split_ratio < 1.0) {
        return Err(PairtraderError::ConfigInvalid {
            section: "search".into(),
            key: "split_ratio".into(),
            reason: format!("{split_ratio} is not in (0, 1)"),
        });
    }

    Ok(SearchGrid {
        model_space,
        strategy_space,
        split_ratio,
    })
}

fn run_search(config_path: &PathBuf, instrument_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let staged = candle_store(&config)
        .and_then(|candles| strategy_store(&config).map(|s| (candles, s)))
        .and_then(|(candles, strategies)| {
            build_grid(&config).map(|grid| (candles, strategies, grid))
        })
        .and_then(|(candles, strategies, grid)| {
            resolve_instruments(instrument_override, &config)
                .map(|instruments| (candles, strategies, grid, instruments))
        });
    let (candles, strategies, grid, instruments) = match staged {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Searching {} model x {} strategy combinations",
        grid.model_space.len(),
        grid.strategy_space.len()
    );

    let mut succeeded = 0usize;
    for instrument in &instruments {
        match search_instrument(&candles, &strategies, &grid, instrument) {
            Ok(()) => succeeded += 1,
            Err(e) => eprintln!("warning: skipping {instrument} ({e})"),
        }
    }

    if succeeded == 0 {
        eprintln!("error: no instrument produced a result");
        return ExitCode::from(5);
    }
    ExitCode::SUCCESS
}

fn search_instrument(
    candle_store: &CsvCandleStore,
    strategy_store: &JsonStrategyStore,
    grid: &SearchGrid,
    instrument: &Instrument,
) -> Result<(), PairtraderError> {
    let candles = candle_store.fetch_candles(instrument)?;
    let transformer = FeatureTransformer::new(instrument.pip_factor());
    let dataset = transformer.build_dataset(&candles);

    let best = search::search(
        &|| Box::new(RegressionTree::new()) as Box<dyn PredictiveModel>,
        grid,
        &candles,
        &dataset,
        instrument.pip_factor(),
        instrument.name(),
    )?;

    let (_, test) = split_dataset(&dataset, grid.split_ratio)?;
    let report = evaluate(best.model.as_ref(), test)?;

    eprintln!("\n{instrument}: score {:.4}", best.score);
    eprintln!("  strategy: {}", best.strategy_params.describe());
    eprintln!("  model:    {:?}", best.model_params);
    eprintln!(
        "  test window: avg abs error {:.1} pips, wrong direction {:.1}%",
        report.avg_abs_error,
        report.wrong_direction_rate * 100.0
    );

    strategy_store.save(&StoredStrategy::from_result(instrument, &best))?;
    Ok(())
}

fn run_dry_run(config_path: &PathBuf, instrument_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let staged = candle_store(&config)
        .and_then(|candles| strategy_store(&config).map(|s| (candles, s)))
        .and_then(|(candles, strategies)| {
            resolve_instruments(instrument_override, &config)
                .map(|instruments| (candles, strategies, instruments))
        });
    let (candles, strategies, instruments) = match staged {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let split_ratio = config.get_double("search", "split_ratio", 0.8);

    for instrument in &instruments {
        if let Err(e) = dry_run_instrument(&candles, &strategies, split_ratio, instrument) {
            eprintln!("error: {instrument}: {e}");
            return (&e).into();
        }
    }
    ExitCode::SUCCESS
}

fn dry_run_instrument(
    candle_store: &CsvCandleStore,
    strategy_store: &JsonStrategyStore,
    split_ratio: f64,
    instrument: &Instrument,
) -> Result<(), PairtraderError> {
    let stored = strategy_store.load(instrument)?;

    let candles = candle_store.fetch_candles(instrument)?;
    let transformer = FeatureTransformer::new(instrument.pip_factor());
    let dataset = transformer.build_dataset(&candles);
    let (train, test) = split_dataset(&dataset, split_ratio)?;

    let mut model = RegressionTree::new();
    let features: Vec<_> = train.iter().map(|r| r.features).collect();
    let targets: Vec<f64> = train.iter().map(|r| r.target).collect();
    model.fit(&features, &targets, &stored.model_params)?;

    let days = align_test_days(&candles, test)?;
    let run = dry_run(
        &model,
        &days,
        &stored.strategy_params,
        instrument.pip_factor(),
        instrument.name(),
    )?;

    println!("{}", run.report);
    Ok(())
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let staged =
        candle_store(&config).and_then(|candles| strategy_store(&config).map(|s| (candles, s)));
    let (candles, strategies) = match staged {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let instruments = match candles.list_instruments() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if instruments.is_empty() {
        eprintln!("No candle files found");
    }
    for instrument in &instruments {
        match candles.fetch_candles(instrument) {
            Ok(series) if series.is_empty() => {
                println!("{instrument}: no candles");
            }
            Ok(series) => {
                println!(
                    "{instrument}: {} candles, {} to {}",
                    series.len(),
                    series[0].date,
                    series[series.len() - 1].date
                );
            }
            Err(e) => {
                eprintln!("error reading {instrument}: {e}");
            }
        }
    }

    match strategies.list() {
        Ok(names) if names.is_empty() => eprintln!("No stored strategies"),
        Ok(names) => {
            eprintln!("\nStored strategies:");
            for name in &names {
                match strategies.load(&Instrument::new(name.clone())) {
                    Ok(s) => println!(
                        "  {name}: score {:.4}, {}",
                        s.score,
                        s.strategy_params.describe()
                    ),
                    Err(e) => eprintln!("  error reading {name}: {e}"),
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    ExitCode::SUCCESS
}
