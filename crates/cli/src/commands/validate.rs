use std::path::Path;

use anyhow::Result;
use cabinguard_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use cabinguard_core::diagnostics::{render_header, render_trace};
use cabinguard_core::rbd::{MemoizedRuleValidator, RbdServices, StaticRuleValidator};
use cabinguard_core::{
    ApplicationError, CabinTable, Cat31Result, DiagnosticLevel, RbdTrace, RbdValidator,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::commands::CommandResult;
use crate::scenario::{PreparedMarket, PreparedScenario, Scenario};

const COMMAND: &str = "validate";

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub diagnostic_level: DiagnosticLevel,
    pub rbd_by_cabin: bool,
    pub markets: Vec<MarketReport>,
}

#[derive(Debug, Serialize)]
pub struct MarketReport {
    pub market: String,
    pub governing_carrier: String,
    pub active: bool,
    pub previous: Option<&'static str>,
    pub hierarchy_size: usize,
    pub candidates: Vec<CandidateReport>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diagnostic: String,
}

#[derive(Debug, Serialize)]
pub struct CandidateReport {
    pub fare_id: String,
    pub fare_class: String,
    pub nuc_amount: Decimal,
    pub cat31: Cat31Result,
    /// Decision with the scenario's fare path, asked only after a postponement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat31_with_fare_path: Option<Cat31Result>,
    pub cat33: bool,
}

pub fn run(scenario_path: &Path, diag: Option<DiagnosticLevel>) -> CommandResult {
    match execute(scenario_path, diag) {
        Ok(report) => {
            let candidates: usize =
                report.markets.iter().map(|market| market.candidates.len()).sum();
            let message = format!(
                "validated {candidates} candidate fares in {} markets",
                report.markets.len()
            );
            CommandResult::success(COMMAND, message, &report)
        }
        Err(error) => {
            let (error_class, exit_code) = match error.downcast_ref::<ApplicationError>() {
                Some(error) => (error.error_class(), error.exit_code()),
                None => ("runtime", 1),
            };
            CommandResult::failure(COMMAND, error_class, format!("{error:#}"), exit_code)
        }
    }
}

fn execute(scenario_path: &Path, diag: Option<DiagnosticLevel>) -> Result<ValidationReport> {
    let options = LoadOptions {
        overrides: ConfigOverrides { diagnostic_level: diag, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = AppConfig::load(options).map_err(ApplicationError::from)?;

    let mut cabins = match &config.validation.cabin_table_path {
        Some(path) => CabinTable::load(path)?,
        None => CabinTable::default(),
    };
    let scenario = Scenario::load(scenario_path)?;
    // Scenario rows are added last so they win over the configured table.
    for record in scenario.cabins.iter().cloned() {
        cabins.insert(record);
    }
    let prepared = scenario.prepare(&cabins)?;

    let rules = MemoizedRuleValidator::new(StaticRuleValidator::new(
        prepared.rule_failures.iter().cloned(),
    ));
    let mut services = RbdServices::new(&cabins, &rules);
    if config.validation.rbd_by_cabin_enabled {
        services = services.with_rbd_by_cabin(&cabins);
    }

    let level = config.validation.diagnostic_level;
    let markets = prepared
        .markets
        .iter()
        .map(|market| validate_market(services, &prepared, market, level))
        .collect();

    info!(
        event_name = "cli.validate.completed",
        scenario = %scenario_path.display(),
        markets = prepared.markets.len(),
        cached_rule_answers = rules.cached_answers(),
        "scenario validated"
    );

    Ok(ValidationReport {
        diagnostic_level: level,
        rbd_by_cabin: config.validation.rbd_by_cabin_enabled,
        markets,
    })
}

fn validate_market(
    services: RbdServices<'_>,
    prepared: &PreparedScenario,
    market: &PreparedMarket,
    level: DiagnosticLevel,
) -> MarketReport {
    let validator =
        RbdValidator::new(services, &prepared.trx, &market.market, &market.fares, &prepared.itin);

    let mut diagnostic = String::new();
    if let Some(header) = validator.header() {
        diagnostic.push_str(&render_header(&header, level));
    }

    let candidates = market
        .candidates
        .iter()
        .map(|candidate| {
            let mut trace = RbdTrace::default();
            let cat31 = validator.validate_cat31(candidate, None, Some(&mut trace));
            let cat31_with_fare_path = match (cat31, prepared.fare_path.as_ref()) {
                (Cat31Result::PostponedToPhase2, Some(fare_path)) => {
                    Some(validator.validate_cat31(candidate, Some(fare_path), Some(&mut trace)))
                }
                _ => None,
            };
            let cat33 = validator.validate_cat33(candidate, Some(&mut trace));
            diagnostic.push_str(&render_trace(&trace, level));

            CandidateReport {
                fare_id: candidate.id.to_string(),
                fare_class: candidate.fare_class.clone(),
                nuc_amount: candidate.nuc_amount,
                cat31,
                cat31_with_fare_path,
                cat33,
            }
        })
        .collect();

    MarketReport {
        market: market.market.city_pair(),
        governing_carrier: market.market.governing_carrier.to_string(),
        active: validator.is_active(),
        previous: validator.previous().map(|previous| previous.name()),
        hierarchy_size: validator.hierarchy().map_or(0, |hierarchy| hierarchy.len()),
        candidates,
        diagnostic,
    }
}
