//! Legend interaction bridge
//!
//! Legend entries are bound to a series by name. A series that colours by data
//! name exposes one entry per point; otherwise its single entry is its legend
//! name. Every handled event ends with exactly one repaint scoped to the series.

use crate::host::ChartHost;
use crate::model::{Serie, SerieData};

/// What a legend entry controls, resolved by name for each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendBinding {
    /// One data point of the series
    Data {
        data_index: usize,
        visible: bool,
        highlighted: bool,
    },
    /// The whole series
    Serie {
        index: usize,
        active: bool,
        hovered: bool,
    },
}

/// Resolve the binding of a legend name, `None` when it names nothing here
pub fn resolve_legend_binding(
    serie: &Serie,
    legend_name: &str,
    legend_hovered: bool,
) -> Option<LegendBinding> {
    if serie.use_data_name_for_color {
        if let Some((data_index, data)) = serie
            .data
            .iter()
            .enumerate()
            .find(|(_, d)| d.name == legend_name)
        {
            return Some(LegendBinding::Data {
                data_index,
                visible: data.show,
                highlighted: data.context.highlight,
            });
        }
    }
    if serie.is_legend_name(legend_name) {
        return Some(LegendBinding::Serie {
            index: serie.index,
            active: serie.show,
            hovered: legend_hovered,
        });
    }
    None
}

fn data_points_named<'a>(
    serie: &'a mut Serie,
    legend_name: &'a str,
) -> impl Iterator<Item = &'a mut SerieData> + 'a {
    serie.data.iter_mut().filter(move |d| d.name == legend_name)
}

/// Show or hide what a legend entry controls
pub fn on_legend_click(
    serie: &mut Serie,
    host: &mut dyn ChartHost,
    legend_index: usize,
    legend_name: &str,
    show: bool,
    legend_hovered: bool,
) -> Option<LegendBinding> {
    let binding = resolve_legend_binding(serie, legend_name, legend_hovered)?;
    match binding {
        LegendBinding::Data { .. } => {
            for data in data_points_named(serie, legend_name) {
                data.show = show;
            }
            host.update_legend_color(legend_name, show);
        }
        LegendBinding::Serie { .. } => {
            serie.show = show;
        }
    }
    tracing::debug!(
        target: "serie_engine::legend",
        serie = serie.index,
        legend_index,
        legend_name,
        show,
        "legend click"
    );
    host.request_repaint(Some(serie.index));
    resolve_legend_binding(serie, legend_name, legend_hovered)
}

/// Highlight what a legend entry controls, or clear the highlight.
///
/// `legend_hovered` is the series-level hover flag, updated in place.
pub fn on_legend_hover(
    serie: &mut Serie,
    host: &mut dyn ChartHost,
    legend_index: usize,
    legend_name: &str,
    hovered: bool,
    legend_hovered: &mut bool,
) -> Option<LegendBinding> {
    let binding = resolve_legend_binding(serie, legend_name, *legend_hovered)?;
    match binding {
        LegendBinding::Data { .. } => {
            for data in data_points_named(serie, legend_name) {
                data.context.highlight = hovered;
            }
        }
        LegendBinding::Serie { .. } => {
            *legend_hovered = hovered;
        }
    }
    tracing::trace!(
        target: "serie_engine::legend",
        serie = serie.index,
        legend_index,
        legend_name,
        hovered,
        "legend hover"
    );
    host.request_repaint(Some(serie.index));
    resolve_legend_binding(serie, legend_name, *legend_hovered)
}

pub fn on_legend_enter(
    serie: &mut Serie,
    host: &mut dyn ChartHost,
    legend_index: usize,
    legend_name: &str,
    legend_hovered: &mut bool,
) -> Option<LegendBinding> {
    on_legend_hover(serie, host, legend_index, legend_name, true, legend_hovered)
}

pub fn on_legend_exit(
    serie: &mut Serie,
    host: &mut dyn ChartHost,
    legend_index: usize,
    legend_name: &str,
    legend_hovered: &mut bool,
) -> Option<LegendBinding> {
    on_legend_hover(serie, host, legend_index, legend_name, false, legend_hovered)
}
