use serde::Serialize;
use wearcast_core::config::{AppConfig, LoadOptions};
use wearcast_core::{Catalog, CatalogSource, CsvFileSource, Season};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct CatalogSummary {
    command: &'static str,
    status: &'static str,
    source: String,
    rows: usize,
    rows_per_season: Vec<(Season, usize)>,
    conditions: Vec<String>,
    activities: Vec<String>,
    formalities: Vec<String>,
}

pub fn run(json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "catalog",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let source = CsvFileSource::new(config.catalog.path.clone());
    let catalog = match source.load() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(
                "catalog",
                "catalog_load",
                format!("{error}; run `wearcast seed` to create the sample catalog"),
                3,
            );
        }
    };

    let summary = summarize(source.describe(), &catalog);
    let output = if json_output {
        serde_json::to_string_pretty(&summary).unwrap_or_else(|error| {
            CommandResult::failure("catalog", "serialization", error.to_string(), 1).output
        })
    } else {
        render_human(&summary)
    };

    CommandResult { exit_code: 0, output }
}

fn summarize(source: String, catalog: &Catalog) -> CatalogSummary {
    let rows_per_season = Season::ALL
        .iter()
        .map(|season| {
            let count =
                catalog.records().iter().filter(|record| record.season() == *season).count();
            (*season, count)
        })
        .collect();

    CatalogSummary {
        command: "catalog",
        status: "ok",
        source,
        rows: catalog.len(),
        rows_per_season,
        conditions: catalog.conditions(),
        activities: catalog.activities(),
        formalities: catalog.formalities(),
    }
}

fn render_human(summary: &CatalogSummary) -> String {
    let seasons = summary
        .rows_per_season
        .iter()
        .map(|(season, count)| format!("{season}={count}"))
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!("catalog {} ({} rows)", summary.source, summary.rows),
        format!("- seasons: {seasons}"),
        format!("- conditions: {}", summary.conditions.join(", ")),
        format!("- activities: {}", summary.activities.join(", ")),
        format!("- formalities: {}", summary.formalities.join(", ")),
    ]
    .join("\n")
}
