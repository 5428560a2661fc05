use std::path::PathBuf;

use log::info;

use crate::charts::{
    breakthrough_chart, implied_effectiveness_chart, BreakthroughChartParams, ImpliedChartParams,
    B_VS_V_FILE, E_VS_V_FILE,
};
use crate::error::BreakthroughError;
use crate::figure::Figure;
use crate::output::{validate_chart_path, OutputOptions};
use crate::render::save_figure;

fn save_chart(
    options: &OutputOptions,
    name: &str,
    figure: &Figure,
) -> Result<PathBuf, BreakthroughError> {
    let path = options.chart_path(name);
    validate_chart_path(&path, options.overwrite)?;
    save_figure(figure, &path)?;
    Ok(path)
}

/// Builds both charts with their default parameters and writes them under `options`.
///
/// Returns the written paths in the order the charts were produced.
///
/// # Errors
///
/// Returns the first error raised while building, rendering or saving a chart.
pub fn run(options: &OutputOptions) -> Result<Vec<PathBuf>, BreakthroughError> {
    info!(
        "writing charts to {} (overwrite: {})",
        options.directory.display(),
        options.overwrite
    );

    let figure = breakthrough_chart(&BreakthroughChartParams::default())?;
    let breakthrough_path = save_chart(options, B_VS_V_FILE, &figure)?;

    let figure = implied_effectiveness_chart(&ImpliedChartParams::default())?;
    let implied_path = save_chart(options, E_VS_V_FILE, &figure)?;

    info!("wrote 2 charts");
    Ok(vec![breakthrough_path, implied_path])
}
