//! Batch driver for the valuation engine
//!
//! `scenarios` evaluates a JSON file of named scenarios in parallel and
//! prints the results as JSON. `portfolio` loads assets from CSV and prints
//! the portfolio metrics.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use valuation_engine::{
    financing_adjustment, score, value_asset, ApproachInput, CashFlowSchedule,
    DcfAssumptions, DcfResult, EngineConfig, FinancingAdjustment, ReconciledValuation,
    RiskFactor, RiskProfile, ValidationWarning,
};
use valuation_engine::dcf::{compute_dcf_with, MAX_HOLDING_PERIOD, MIN_HOLDING_PERIOD};
use valuation_engine::portfolio::{aggregate, load_assets, value_weights};
use valuation_engine::risk::{ClimateExposure, RiskBand};
use valuation_engine::valuation::{CostInputs, IncomeInputs};

#[derive(Parser)]
#[command(name = "run_valuation", about = "Property valuation and ESG risk calculations")]
struct Cli {
    /// Engine config JSON (defaults apply to anything it omits)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a JSON array of scenarios
    Scenarios {
        file: PathBuf,
    },
    /// Aggregate a CSV of portfolio assets
    Portfolio {
        file: PathBuf,
        /// Replace the file's weights with each asset's share of total value
        #[arg(long)]
        value_weights: bool,
    },
}

/// One named case from the scenario file; any section may be omitted
#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[serde(default)]
    dcf: Option<DcfScenario>,
    #[serde(default)]
    valuation: Option<ValuationScenario>,
    #[serde(default)]
    risk: Option<RiskScenario>,
}

#[derive(Debug, Deserialize)]
struct DcfScenario {
    cash_flows: Vec<f64>,
    assumptions: DcfAssumptions,
}

#[derive(Debug, Deserialize)]
struct ValuationScenario {
    #[serde(default)]
    approaches: Vec<ApproachInput>,
    /// Operating figures, converted to an income approach
    #[serde(default)]
    income: Option<IncomeInputs>,
    /// Physical description, priced from the benchmark table
    #[serde(default)]
    cost: Option<CostInputs>,
    #[serde(default)]
    subject_units: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RiskScenario {
    #[serde(default)]
    factors: Vec<RiskFactor>,
    #[serde(default)]
    climate: Option<ClimateExposure>,
    base_lvr: f64,
    base_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome<T> {
    Ok(T),
    Error(String),
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::Error(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct RiskOutcome {
    score: f64,
    band: RiskBand,
    financing: FinancingAdjustment,
    warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Serialize)]
struct ScenarioOutcome {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dcf: Option<Outcome<DcfResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valuation: Option<Outcome<ReconciledValuation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk: Option<Outcome<RiskOutcome>>,
}

fn run_dcf(scenario: &DcfScenario, config: &EngineConfig) -> Result<DcfResult> {
    let schedule = CashFlowSchedule::from_amounts(&scenario.cash_flows)?;
    if !schedule.has_standard_holding_period() {
        anyhow::bail!(
            "holding period of {} years is outside {}-{}",
            schedule.holding_period(),
            MIN_HOLDING_PERIOD,
            MAX_HOLDING_PERIOD
        );
    }
    Ok(compute_dcf_with(&schedule, &scenario.assumptions, &config.irr_solver)?)
}

fn run_valuation(scenario: &ValuationScenario, config: &EngineConfig) -> Result<ReconciledValuation> {
    let mut inputs = scenario.approaches.clone();
    if let Some(income) = &scenario.income {
        inputs.push(income.to_approach()?);
    }
    if let Some(cost) = &scenario.cost {
        inputs.push(cost.to_approach(&config.benchmarks)?);
    }
    Ok(value_asset(&inputs, &config.approach_weights, scenario.subject_units)?)
}

fn run_risk(scenario: &RiskScenario, config: &EngineConfig) -> Result<RiskOutcome> {
    let mut profile = RiskProfile::new(scenario.factors.clone());
    if let Some(climate) = &scenario.climate {
        profile.factors.extend(climate.to_profile()?.factors);
    }
    let warnings = profile.validate();
    let composite = score(&profile);
    Ok(RiskOutcome {
        score: composite,
        band: config.risk_bands.classify(composite),
        financing: financing_adjustment(scenario.base_lvr, scenario.base_rate, composite, &config.financing),
        warnings,
    })
}

fn evaluate(scenario: &Scenario, config: &EngineConfig) -> ScenarioOutcome {
    ScenarioOutcome {
        name: scenario.name.clone(),
        dcf: scenario.dcf.as_ref().map(|s| run_dcf(s, config).into()),
        valuation: scenario.valuation.as_ref().map(|s| run_valuation(s, config).into()),
        risk: scenario.risk.as_ref().map(|s| run_risk(s, config).into()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load engine config")?;

    match cli.command {
        Command::Scenarios { file } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let scenarios: Vec<Scenario> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            log::info!("Evaluating {} scenarios", scenarios.len());

            let outcomes: Vec<ScenarioOutcome> = scenarios
                .par_iter()
                .map(|scenario| evaluate(scenario, &config))
                .collect();

            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        Command::Portfolio { file, value_weights: by_value } => {
            let mut assets = load_assets(&file)
                .with_context(|| format!("Failed to load assets from {}", file.display()))?;
            if by_value {
                value_weights(&mut assets)?;
            }
            let metrics = aggregate(&assets, &config.portfolio)?;
            for warning in &metrics.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    log::info!("Completed in {:?}", start.elapsed());
    Ok(())
}
