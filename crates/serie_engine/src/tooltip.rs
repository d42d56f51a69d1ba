//! Tooltip parameter builder
//!
//! Resolves the targeted data point of a series and fills the series' reusable
//! parameter record, which is then appended to the caller's list so several
//! series can contribute to one tooltip.

use crate::host::ChartHost;
use crate::model::{Color, Serie};

/// One series' contribution to a tooltip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerieParams {
    pub serie_name: String,
    pub serie_index: usize,
    pub category: String,
    /// Value dimension that was requested
    pub dimension: usize,
    /// Position of the resolved point in the series data
    pub data_index: Option<usize>,
    pub value: f64,
    /// Reference total (series y-total or dimension max, per variant)
    pub total: f64,
    pub color: Color,
    pub marker: String,
    pub item_formatter: String,
    pub numeric_formatter: String,
    /// Display tuple: marker, name, formatted value
    pub columns: Vec<String>,
}

/// How the parameter record is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipVariant {
    /// Coordinate series (line, bar): y value, y total, coloured by series
    Coordinate,
    /// Item series (pie, ...): value of `dimension`, its max, coloured by point
    Item { dimension: usize },
}

/// A tooltip parameter request
#[derive(Debug, Clone, Copy)]
pub struct TooltipRequest<'a> {
    /// Point to describe; `None` uses the point under the pointer
    pub data_index: Option<usize>,
    pub show_category: bool,
    pub category: &'a str,
    pub marker: &'a str,
    pub item_formatter: Option<&'a str>,
    pub numeric_formatter: Option<&'a str>,
    pub variant: TooltipVariant,
}

impl<'a> TooltipRequest<'a> {
    /// A coordinate-variant request for a point
    pub fn new(data_index: Option<usize>, category: &'a str, marker: &'a str) -> Self {
        Self {
            data_index,
            show_category: false,
            category,
            marker,
            item_formatter: None,
            numeric_formatter: None,
            variant: TooltipVariant::Coordinate,
        }
    }

    pub fn with_variant(mut self, variant: TooltipVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_item_formatter(mut self, formatter: &'a str) -> Self {
        self.item_formatter = Some(formatter);
        self
    }
}

/// Result of a tooltip request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipOutcome {
    /// A parameter record was appended
    Appended,
    /// No point resolved
    NoTarget,
    /// The item formatter suppresses this series
    Suppressed,
}

/// Append this series' tooltip parameters to `params`.
///
/// For the coordinate variant without a category column, an empty `title` is
/// set to the category.
pub fn build_tooltip_params(
    serie: &mut Serie,
    host: &dyn ChartHost,
    request: &TooltipRequest<'_>,
    params: &mut Vec<SerieParams>,
    title: &mut String,
) -> TooltipOutcome {
    let Some(data_index) = request
        .data_index
        .or(serie.context.pointer_item_data_index)
    else {
        return TooltipOutcome::NoTarget;
    };
    let Some(data) = serie.data.get(data_index) else {
        tracing::trace!(
            target: "serie_engine::tooltip",
            serie = serie.index,
            data_index,
            "tooltip target out of range"
        );
        return TooltipOutcome::NoTarget;
    };

    let formatter = host.formatter();
    let item_formatter = formatter.resolve_formatter(
        request.item_formatter,
        data.item_formatter.as_deref(),
        serie.item_formatter.as_deref(),
        "",
    );
    if formatter.is_ignore(&item_formatter) {
        return TooltipOutcome::Suppressed;
    }
    let marker = formatter.resolve_formatter(
        None,
        data.marker.as_deref(),
        serie.marker.as_deref(),
        request.marker,
    );
    let numeric_formatter = formatter.resolve_formatter(
        None,
        data.numeric_formatter.as_deref(),
        serie.numeric_formatter.as_deref(),
        request.numeric_formatter.unwrap_or(""),
    );

    let theme = host.theme();
    let (dimension, total, color, name_column) = match request.variant {
        TooltipVariant::Coordinate => (
            1,
            serie.y_total(),
            theme.legend_color(&serie.legend_name()),
            if request.show_category {
                request.category.to_string()
            } else {
                serie.serie_name.clone()
            },
        ),
        TooltipVariant::Item { dimension } => (
            dimension,
            serie.max_data(dimension),
            theme.legend_color(&data.name),
            data.name.clone(),
        ),
    };
    let value = data.get_data(dimension);
    let value_text = formatter.format_number(value, &numeric_formatter);

    let param = &mut serie.context.param;
    param.serie_name.clone_from(&serie.serie_name);
    param.serie_index = serie.index;
    param.category = request.category.to_string();
    param.dimension = dimension;
    param.data_index = Some(data_index);
    param.value = value;
    param.total = total;
    param.color = color;
    param.marker = marker;
    param.item_formatter = item_formatter;
    param.numeric_formatter = numeric_formatter;
    param.columns.clear();
    param.columns.push(param.marker.clone());
    param.columns.push(name_column);
    param.columns.push(value_text);
    params.push(param.clone());

    if request.variant == TooltipVariant::Coordinate && !request.show_category && title.is_empty() {
        title.push_str(request.category);
    }
    TooltipOutcome::Appended
}
