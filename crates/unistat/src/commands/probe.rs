//! `probe`: one-shot connection validation.

use owo_colors::OwoColorize;
use serde::Serialize;

use unistat_core::{ControllerConfig, LegacySessionFactory, validate_connection};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ProbeReport {
    controller: String,
    site: String,
    subsystems: usize,
}

pub async fn handle(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let url = config.url.to_string();
    let site = config.site.clone();
    let factory = LegacySessionFactory::new(config);

    let subsystems = validate_connection(&factory)
        .await
        .map_err(|e| CliError::from_probe(e, &url))?;

    let report = ProbeReport {
        controller: url,
        site,
        subsystems,
    };
    let color = output::should_color(global.color);
    let rendered = output::render_single(
        global.output,
        &report,
        |r| {
            let ok = if color {
                "OK".green().to_string()
            } else {
                "OK".into()
            };
            format!(
                "{ok}: {} site '{}' reports {} subsystems",
                r.controller, r.site, r.subsystems
            )
        },
        |r| r.subsystems.to_string(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
