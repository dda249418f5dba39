//! The `distance` command: a one-shot directions lookup.

use serde_json::json;

use mileage_core::distance::DistanceEstimator;

use crate::app::AppContext;
use crate::cli::DistanceArgs;
use crate::errors::CliError;
use crate::ui::format::format_miles;
use crate::ui::{self, Spinner};

pub fn handle_distance(app: &AppContext, args: &DistanceArgs) -> anyhow::Result<()> {
    let ctx = app.ui(args.json);
    let config = app.config()?.directions_config().ok_or_else(|| {
        CliError::configuration_with_hint(
            "Google Maps API key is not configured. Mileage calculation is disabled.",
            "Set GOOGLE_MAPS_API_KEY or [directions] api_key in the config file.",
        )
    })?;
    let estimator = DistanceEstimator::new(config)?;

    let spinner = Spinner::start(&ctx, "Calculating mileage");
    let result = app
        .runtime()?
        .block_on(estimator.estimate(&args.origin, &args.destination));
    spinner.finish();
    let miles = result.map_err(CliError::from)?;

    if ctx.mode.is_json() {
        let value = json!({
            "origin": args.origin,
            "destination": args.destination,
            "miles": miles,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if app.quiet() {
        println!("{:.1}", miles);
    } else {
        ui::print(&ctx, &ui::header(&ctx, "distance", None));
        ui::print(&ctx, &ui::kv(&ctx, "From", args.origin.trim()));
        ui::print(&ctx, &ui::kv(&ctx, "To", args.destination.trim()));
        ui::print(&ctx, &ui::kv(&ctx, "Distance", &format_miles(miles)));
    }
    Ok(())
}
