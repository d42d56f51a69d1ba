//! Headless serie engine driver
//!
//! Usage: `serie_demo [config.json] [series.json]`
//!
//! Without arguments a two-series sample chart is driven over a few frames.
//! Set `RUST_LOG=serie_engine=trace` to follow every engine step.

use anyhow::{Context, Result};
use serie_engine::{
    Chart, EngineConfig, LabelStyle, LayoutPoint, Serie, SerieData, SerieParams, SerieRegistry,
    SerieType, TooltipRequest,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading config {}", path))?;
            EngineConfig::from_json(&json).with_context(|| format!("parsing config {}", path))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn sample_series() -> Vec<Serie> {
    let days = ["Mon", "Tue", "Wed", "Thu", "Fri"];
    let sales = [120.0, 200.0, 150.0, 80.0, 70.0];
    let costs = [60.0, 90.0, 95.0, 40.0, 55.0];
    let build = |index: usize, name: &str, values: &[f64]| {
        let data = days
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (day, value))| {
                let mut point = SerieData::new(*day, vec![i as f64, *value]);
                point.context.position = LayoutPoint::new(40.0 + 80.0 * i as f64, 300.0 - value);
                point
            })
            .collect();
        Serie::new(index, name, SerieType::Line)
            .with_label(LabelStyle::shown().with_offset(0.0, -8.0))
            .with_data(data)
    };
    vec![build(0, "Sales", &sales), build(1, "Costs", &costs)]
}

fn load_registry(config: EngineConfig, path: Option<&str>) -> Result<SerieRegistry> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading series {}", path))?;
            SerieRegistry::from_json(config, &json).with_context(|| format!("parsing series {}", path))
        }
        None => {
            let mut registry = SerieRegistry::new(config);
            for serie in sample_series() {
                registry.add_serie(serie)?;
            }
            Ok(registry)
        }
    }
}

fn log_labels(registry: &SerieRegistry, index: usize) {
    let (Some(serie), Some(engine)) = (registry.serie(index), registry.engine(index)) else {
        return;
    };
    for (handle, label) in engine.pool().iter_live() {
        tracing::info!(
            serie = serie.serie_name.as_str(),
            slot = handle.slot(),
            name = label.name.as_str(),
            text = label.text.as_str(),
            active = label.active,
            "label"
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let mut registry = load_registry(config, args.get(1).map(String::as_str))?;
    let mut chart = Chart::default();
    for name in ["Sales", "Costs"] {
        chart.theme.register_legend(name);
    }

    tracing::info!(series = registry.len(), "starting");

    // Frame 1: initialisation
    registry.advance_frame(&mut chart);
    let shown = registry.refresh_labels(&chart);
    tracing::info!(shown, repaints = chart.take_repaints().len(), "frame 1");
    log_labels(&registry, 0);

    // Frame 2: a value edit rebuilds the labels of one series
    if let Some(serie) = registry.serie_mut(0) {
        serie.update_data(2, 1, 175.0);
    }
    registry.advance_frame(&mut chart);
    registry.refresh_labels(&chart);
    tracing::info!(repaints = chart.take_repaints().len(), "frame 2");
    log_labels(&registry, 0);

    // Frame 3: hide a series from the legend
    registry.on_legend_click(&mut chart, 1, "Costs", false);
    registry.advance_frame(&mut chart);
    let shown = registry.refresh_labels(&chart);
    tracing::info!(shown, repaints = chart.take_repaints().len(), "frame 3");

    let mut params: Vec<SerieParams> = Vec::new();
    let mut title = String::new();
    let request = TooltipRequest::new(Some(1), "Tue", "●");
    registry.build_tooltip_params(&chart, &request, &mut params, &mut title);
    for param in &params {
        tracing::info!(title = title.as_str(), columns = ?param.columns, "tooltip");
    }

    let stats = registry.total_stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
