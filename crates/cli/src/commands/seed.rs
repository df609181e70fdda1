use crate::commands::CommandResult;
use tracing::info;
use wearcast_core::config::{AppConfig, LoadOptions};
use wearcast_core::Catalog;

pub fn run(force: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let path = &config.catalog.path;
    if path.exists() && !force {
        return CommandResult::failure(
            "seed",
            "catalog_exists",
            format!("catalog `{}` already exists; pass --force to overwrite it", path.display()),
            5,
        );
    }

    let catalog = match Catalog::sample() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "sample_invalid",
                format!("built-in sample row is invalid: {error}"),
                3,
            );
        }
    };
    if let Err(error) = catalog.write_to_path(path) {
        return CommandResult::failure("seed", "catalog_write", error.to_string(), 3);
    }

    info!(
        event_name = "catalog.seeded",
        path = %path.display(),
        rows = catalog.len(),
        "sample catalog written"
    );
    CommandResult::success(
        "seed",
        format!("wrote {} sample outfits to `{}`", catalog.len(), path.display()),
    )
}
