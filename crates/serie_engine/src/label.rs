//! Data label binder
//!
//! Two passes keep data labels in sync with the series:
//!
//! - **rebuild** releases every pooled label of the series, recomputes the
//!   series centre, and acquires one label per eligible point. Points are
//!   visited in data order with each point's children flattened depth-first
//!   right after it, and every visited point gets the next label index.
//! - **refresh** recomputes text, colour, rotation, position and visibility of
//!   the labels that already exist. It never acquires or releases.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::format::FormatArgs;
use crate::host::ChartHost;
use crate::layout::LayoutPoint;
use crate::model::{Color, LabelPosition, LabelStyle, Serie, SerieData, SerieType};
use crate::pool::{LabelKey, LabelRequest, VisualPool};

/// Where a label is anchored before its offset is applied
pub trait LabelAnchor {
    fn anchor(&self, serie: &Serie, data: &SerieData, label: &LabelStyle) -> LayoutPoint;
}

/// Anchors labels on the point's screen position
#[derive(Debug, Clone, Copy, Default)]
pub struct PointAnchor;

impl LabelAnchor for PointAnchor {
    fn anchor(&self, _serie: &Serie, data: &SerieData, _label: &LabelStyle) -> LayoutPoint {
        data.context.position
    }
}

/// Outcome of a rebuild pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelRebuild {
    /// Points that received a label index
    pub visited: usize,
    /// Labels acquired from the pool
    pub created: usize,
}

/// Deterministic pooled-object name for a label
pub fn label_object_name(prefix: &str, serie_index: usize, data_index: usize) -> String {
    format!("{}_{}_{}", prefix, serie_index, data_index)
}

/// A point gets a label object when labels are allowed for the series and
/// its label, emphasis label or icon is shown.
pub fn is_label_eligible(serie: &Serie, data: &SerieData) -> bool {
    if serie.is_performance_mode() {
        return false;
    }
    serie.label_for(data).is_some_and(|l| l.show)
        || serie.emphasis_label_for(data).is_some_and(|l| l.show)
        || serie.icon_style_for(data).is_some_and(|i| i.show)
}

/// Label order of the series' points: data order, children depth-first.
///
/// Points referenced as a child are visited under their parent only. A point
/// reached twice or a child index out of range is skipped.
pub fn flatten_label_order(serie: &Serie) -> Vec<usize> {
    let count = serie.data.len();
    let mut is_child = vec![false; count];
    for data in &serie.data {
        for &child in &data.children {
            if child < count {
                is_child[child] = true;
            }
        }
    }

    let mut visited = vec![false; count];
    let mut order = Vec::with_capacity(count);
    for root in (0..count).filter(|&i| !is_child[i]) {
        visit_depth_first(serie, root, &mut visited, &mut order);
    }
    // Only points caught in a child cycle remain
    for index in 0..count {
        if !visited[index] {
            tracing::warn!(
                target: "serie_engine::label",
                serie = serie.index,
                data = index,
                "point only reachable through a child cycle"
            );
            visit_depth_first(serie, index, &mut visited, &mut order);
        }
    }
    order
}

fn visit_depth_first(serie: &Serie, start: usize, visited: &mut [bool], order: &mut Vec<usize>) {
    let mut stack = vec![start];
    while let Some(index) = stack.pop() {
        if visited[index] {
            tracing::warn!(
                target: "serie_engine::label",
                serie = serie.index,
                data = index,
                "point reached twice while flattening children"
            );
            continue;
        }
        visited[index] = true;
        order.push(index);
        for &child in serie.data[index].children.iter().rev() {
            if child >= serie.data.len() {
                tracing::warn!(
                    target: "serie_engine::label",
                    serie = serie.index,
                    parent = index,
                    child,
                    "child index out of range"
                );
                continue;
            }
            stack.push(child);
        }
    }
}

/// Release and recreate every label of the series.
///
/// On failure all labels acquired by this pass are released again and every
/// point is left unbound.
pub fn rebuild_labels<P: VisualPool + ?Sized>(
    serie: &mut Serie,
    pool: &mut P,
    host: &dyn ChartHost,
    config: &EngineConfig,
) -> EngineResult<LabelRebuild> {
    pool.release_all();
    for data in serie.data.iter_mut() {
        data.label_object = None;
    }
    serie.context.center = host.layout().compute_center(serie, &host.chart_bounds());

    let order = flatten_label_order(serie);
    let text_color = host.theme().text_color();
    let fallback_style = LabelStyle::default();
    let mut summary = LabelRebuild::default();

    for (label_index, &position) in order.iter().enumerate() {
        let acquired = {
            let data = &serie.data[position];
            if !is_label_eligible(serie, data) {
                None
            } else {
                let style = serie
                    .label_for(data)
                    .or_else(|| serie.emphasis_label_for(data))
                    .unwrap_or(&fallback_style);
                let icon = serie.icon_style_for(data);
                let request = LabelRequest {
                    name: label_object_name(&config.label_object_prefix, serie.index, label_index),
                    key: LabelKey {
                        serie_index: serie.index,
                        data_index: label_index,
                    },
                    style,
                    color: text_color,
                    icon_size: icon
                        .map(|i| (i.width, i.height))
                        .unwrap_or(config.default_icon_size),
                };
                let result = pool.acquire(&request);
                match result {
                    Ok(handle) => {
                        if let Some(object) = pool.label_mut(handle) {
                            object.icon_active = icon.is_some_and(|i| i.show);
                        }
                        Some(handle)
                    }
                    Err(err) => {
                        pool.release_all();
                        for data in serie.data.iter_mut() {
                            data.label_object = None;
                        }
                        return Err(err);
                    }
                }
            }
        };

        let data = &mut serie.data[position];
        data.index = label_index;
        data.label_object = acquired;
        summary.visited += 1;
        if acquired.is_some() {
            summary.created += 1;
        }
    }

    tracing::debug!(
        target: "serie_engine::label",
        serie = serie.index,
        visited = summary.visited,
        created = summary.created,
        "labels rebuilt"
    );
    Ok(summary)
}

/// Rotation of a label, keeping radially placed inside labels upright
pub fn label_rotation(rotate: f64, inside: bool, half_angle: f64) -> f64 {
    if !inside || rotate == 0.0 || half_angle <= 0.0 {
        return rotate;
    }
    if half_angle > 180.0 {
        rotate + 270.0 - half_angle
    } else {
        rotate - (half_angle - 90.0)
    }
}

/// Text colour: explicit style colour, white inside the shape, else the theme's
pub fn label_text_color(label: &LabelStyle, host: &dyn ChartHost) -> Color {
    let theme = host.theme();
    if !theme.is_clear(label.text_style.color) {
        label.text_style.color
    } else if label.position == LabelPosition::Inside {
        Color::WHITE
    } else {
        theme.text_color()
    }
}

/// Update every existing label in place from the series' label dimension.
/// Returns the number of labels shown.
pub fn refresh_labels<P: VisualPool + ?Sized>(
    serie: &Serie,
    pool: &mut P,
    host: &dyn ChartHost,
    anchor: &dyn LabelAnchor,
) -> usize {
    let dimension = serie.label_dimension;
    let formatter = host.formatter();
    let total = serie.data_total(dimension);
    let serie_name = serie.legend_name();
    let mut shown = 0;

    for (position, data) in serie.data.iter().enumerate() {
        let Some(handle) = data.label_object else {
            continue;
        };
        let Some(object) = pool.label_mut(handle) else {
            continue;
        };

        let serie_label = serie.label_for(data);
        let emphasis_label = serie.emphasis_label_for(data);
        let is_highlight = data.context.highlight && emphasis_label.is_some_and(|l| l.show);
        let is_ignore = serie.is_ignore_data(data, dimension);
        let current = if is_highlight { emphasis_label } else { serie_label };

        object.position = data.context.position;
        let icon = serie.icon_style_for(data);
        object.icon_active = icon.is_some_and(|i| i.show);
        if let Some(icon) = icon {
            object.icon_size = (icon.width, icon.height);
            object.icon_color = icon.color;
        }

        let label = match current {
            Some(label)
                if serie.show
                    && (label.show || is_highlight)
                    && data.context.can_show_label
                    && !is_ignore =>
            {
                label
            }
            _ => {
                object.active = false;
                continue;
            }
        };

        let value = data.get_data(dimension);
        let content = if serie.use_data_name_for_color && label.formatter.is_empty() {
            data.name.clone()
        } else {
            formatter.format_label(
                &label.formatter,
                &FormatArgs {
                    serie_name: &serie_name,
                    data_name: &data.name,
                    value,
                    total,
                    numeric_formatter: &label.numeric_formatter,
                },
            )
        };

        let invert = label.auto_offset
            && serie.serie_type == SerieType::Line
            && serie.is_down_point(position, dimension)
            && !serie.area_style.as_ref().is_some_and(|a| a.show);
        let inside = label.position == LabelPosition::Inside;
        let offset = if invert { -label.offset } else { label.offset };

        object.text_color = label_text_color(label, host);
        object.rotation = label_rotation(label.text_style.rotate, inside, data.context.half_angle);
        object.font_size = label.text_style.font_size;
        object.background_color = label.text_style.background_color;
        object.active = true;
        object.position = anchor.anchor(serie, data, label) + offset;
        object.text = content;
        shown += 1;
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Chart;
    use crate::model::{AreaStyle, IconStyle};
    use crate::pool::LabelPool;

    fn serie_with(values: &[f64], label: LabelStyle) -> Serie {
        let data = values
            .iter()
            .enumerate()
            .map(|(i, v)| SerieData::new(format!("p{}", i), vec![i as f64, *v]))
            .collect();
        Serie::new(0, "Sales", SerieType::Line)
            .with_label(label)
            .with_data(data)
    }

    fn rebuilt(serie: &mut Serie) -> (LabelPool, Chart) {
        let chart = Chart::default();
        let mut pool = LabelPool::new();
        rebuild_labels(serie, &mut pool, &chart, &EngineConfig::default()).unwrap();
        (pool, chart)
    }

    #[test]
    fn test_rebuild_creates_label_per_eligible_point() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0], LabelStyle::shown());
        let (pool, _) = rebuilt(&mut serie);
        assert_eq!(pool.live_count(), 3);
        let indices: Vec<usize> = serie.data.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            pool.label(serie.data[2].label_object.unwrap()).unwrap().name,
            "label_0_2"
        );
    }

    #[test]
    fn test_ineligible_points_get_no_label() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::shown());
        serie.data[1].label = Some(LabelStyle::default());
        let (pool, _) = rebuilt(&mut serie);
        assert_eq!(pool.live_count(), 1);
        assert!(serie.data[0].label_object.is_some());
        assert!(serie.data[1].label_object.is_none());
        assert_eq!(serie.data[1].index, 1);
    }

    #[test]
    fn test_emphasis_or_icon_makes_point_eligible() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::default());
        assert!(!is_label_eligible(&serie, &serie.data[0]));

        serie.emphasis_label = Some(LabelStyle::shown());
        assert!(is_label_eligible(&serie, &serie.data[0]));

        serie.emphasis_label = None;
        serie.data[1].icon_style = Some(IconStyle {
            show: true,
            ..IconStyle::default()
        });
        assert!(!is_label_eligible(&serie, &serie.data[0]));
        assert!(is_label_eligible(&serie, &serie.data[1]));
    }

    #[test]
    fn test_performance_mode_disables_labels() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::shown());
        serie.performance_mode = true;
        let (pool, _) = rebuilt(&mut serie);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_flatten_children_depth_first() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0, 4.0, 5.0], LabelStyle::shown());
        // 0 -> [2, 3], 2 -> [4]; 1 is a second root
        serie.data[0].children = vec![2, 3];
        serie.data[2].children = vec![4];
        assert_eq!(flatten_label_order(&serie), vec![0, 2, 4, 3, 1]);

        let (pool, _) = rebuilt(&mut serie);
        assert_eq!(pool.live_count(), 5);
        assert_eq!(serie.data[0].index, 0);
        assert_eq!(serie.data[2].index, 1);
        assert_eq!(serie.data[4].index, 2);
        assert_eq!(serie.data[3].index, 3);
        assert_eq!(serie.data[1].index, 4);
    }

    #[test]
    fn test_flatten_skips_bad_children() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0], LabelStyle::shown());
        serie.data[0].children = vec![1, 9, 1];
        serie.data[2].children = vec![1];
        let order = flatten_label_order(&serie);
        assert_eq!(order, vec![0, 1, 2]);

        // a cycle with no root still gets visited
        let mut cyclic = serie_with(&[1.0, 2.0], LabelStyle::shown());
        cyclic.data[0].children = vec![1];
        cyclic.data[1].children = vec![0];
        assert_eq!(flatten_label_order(&cyclic), vec![0, 1]);
    }

    #[test]
    fn test_rebuild_releases_previous_labels() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0], LabelStyle::shown());
        let (mut pool, chart) = rebuilt(&mut serie);
        serie.data.truncate(1);
        rebuild_labels(&mut serie, &mut pool, &chart, &EngineConfig::default()).unwrap();
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.slot_count(), 3);
    }

    #[test]
    fn test_rebuild_failure_rolls_back() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0], LabelStyle::shown());
        let chart = Chart::default();
        let mut pool = LabelPool::with_capacity_limit(2);
        let result = rebuild_labels(&mut serie, &mut pool, &chart, &EngineConfig::default());
        assert!(result.is_err());
        assert_eq!(pool.live_count(), 0);
        assert!(serie.data.iter().all(|d| d.label_object.is_none()));
    }

    #[test]
    fn test_rebuild_updates_center() {
        let mut serie = serie_with(&[1.0], LabelStyle::shown());
        rebuilt(&mut serie);
        assert_eq!(serie.context.center, LayoutPoint::new(200.0, 150.0));
    }

    #[test]
    fn test_label_rotation() {
        assert_eq!(label_rotation(10.0, true, 200.0), 80.0);
        assert_eq!(label_rotation(10.0, true, 45.0), 55.0);
        assert_eq!(label_rotation(10.0, false, 45.0), 10.0);
        assert_eq!(label_rotation(0.0, true, 45.0), 0.0);
        assert_eq!(label_rotation(10.0, true, 0.0), 10.0);
    }

    #[test]
    fn test_refresh_sets_text_and_position() {
        let mut serie = serie_with(&[1.0, 2.0, 3.0], LabelStyle::shown().with_offset(0.0, 5.0));
        let (mut pool, chart) = rebuilt(&mut serie);
        serie.data[1].context.position = LayoutPoint::new(10.0, 20.0);

        let shown = refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert_eq!(shown, 3);
        let label = pool.label(serie.data[1].label_object.unwrap()).unwrap();
        assert_eq!(label.text, "2");
        assert_eq!(label.position, LayoutPoint::new(10.0, 25.0));
        assert_eq!(label.text_color, chart.theme.text_color);
        assert!(label.active);
    }

    #[test]
    fn test_refresh_does_not_touch_pool_allocation() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::shown());
        let (mut pool, chart) = rebuilt(&mut serie);
        let slots = pool.slot_count();
        let live = pool.live_count();
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert_eq!(pool.slot_count(), slots);
        assert_eq!(pool.live_count(), live);
    }

    #[test]
    fn test_refresh_hides_instead_of_removing() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::shown());
        let (mut pool, chart) = rebuilt(&mut serie);
        serie.data[0].context.can_show_label = false;
        serie.ignore = Some(crate::model::IgnoreRule::Value(2.0));

        assert_eq!(refresh_labels(&serie, &mut pool, &chart, &PointAnchor), 0);
        assert_eq!(pool.live_count(), 2);
        assert!(!pool.label(serie.data[0].label_object.unwrap()).unwrap().active);
        assert!(!pool.label(serie.data[1].label_object.unwrap()).unwrap().active);

        serie.ignore = None;
        serie.show = false;
        assert_eq!(refresh_labels(&serie, &mut pool, &chart, &PointAnchor), 0);
    }

    #[test]
    fn test_value_ignore_checks_the_point_itself() {
        // a -> [c]; label order is a, c, b
        let mut serie = serie_with(&[1.0, 99.0, 3.0], LabelStyle::shown());
        serie.data[0].children = vec![2];
        serie.ignore = Some(crate::model::IgnoreRule::Value(99.0));
        let (mut pool, chart) = rebuilt(&mut serie);
        assert_eq!(serie.data[2].index, 1);
        assert_eq!(serie.data[1].index, 2);

        assert_eq!(refresh_labels(&serie, &mut pool, &chart, &PointAnchor), 2);
        let active = |i: usize| pool.label(serie.data[i].label_object.unwrap()).unwrap().active;
        assert!(active(0));
        assert!(!active(1));
        assert!(active(2));
    }

    #[test]
    fn test_refresh_uses_emphasis_when_highlighted() {
        let mut serie = serie_with(&[1.0, 2.0], LabelStyle::default())
            .with_emphasis_label(LabelStyle::shown().with_formatter("{b}!"));
        let (mut pool, chart) = rebuilt(&mut serie);

        assert_eq!(refresh_labels(&serie, &mut pool, &chart, &PointAnchor), 0);
        serie.data[1].context.highlight = true;
        assert_eq!(refresh_labels(&serie, &mut pool, &chart, &PointAnchor), 1);
        let label = pool.label(serie.data[1].label_object.unwrap()).unwrap();
        assert_eq!(label.text, "p1!");
    }

    #[test]
    fn test_refresh_data_name_content() {
        let mut serie = serie_with(&[1.0], LabelStyle::shown());
        serie.use_data_name_for_color = true;
        let (mut pool, chart) = rebuilt(&mut serie);
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert_eq!(pool.label(serie.data[0].label_object.unwrap()).unwrap().text, "p0");
    }

    #[test]
    fn test_refresh_inverts_offset_at_trough() {
        let mut label = LabelStyle::shown().with_offset(0.0, 8.0);
        label.auto_offset = true;
        let mut serie = serie_with(&[3.0, 1.0, 4.0], label);
        let (mut pool, chart) = rebuilt(&mut serie);
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        let position = |serie: &Serie, pool: &LabelPool, i: usize| {
            pool.label(serie.data[i].label_object.unwrap()).unwrap().position
        };
        assert_eq!(position(&serie, &pool, 1), LayoutPoint::new(0.0, -8.0));
        assert_eq!(position(&serie, &pool, 2), LayoutPoint::new(0.0, 8.0));

        serie.area_style = Some(AreaStyle { show: true });
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert_eq!(position(&serie, &pool, 1), LayoutPoint::new(0.0, 8.0));

        serie.area_style = None;
        serie.serie_type = SerieType::Bar;
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert_eq!(position(&serie, &pool, 1), LayoutPoint::new(0.0, 8.0));
    }

    #[test]
    fn test_refresh_text_color_and_rotation() {
        let label = LabelStyle::shown()
            .with_position(LabelPosition::Inside)
            .with_rotate(10.0);
        let mut serie = serie_with(&[1.0, 2.0], label);
        serie.serie_type = SerieType::Pie;
        let (mut pool, chart) = rebuilt(&mut serie);
        serie.data[0].context.half_angle = 200.0;
        serie.data[1].context.half_angle = 45.0;
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);

        let first = pool.label(serie.data[0].label_object.unwrap()).unwrap();
        assert_eq!(first.text_color, Color::WHITE);
        assert_eq!(first.rotation, 80.0);
        let second = pool.label(serie.data[1].label_object.unwrap()).unwrap();
        assert_eq!(second.rotation, 55.0);

        serie.label.as_mut().unwrap().text_style.color = Color::rgb(1, 2, 3);
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        let first = pool.label(serie.data[0].label_object.unwrap()).unwrap();
        assert_eq!(first.text_color, Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_icon_state_follows_style() {
        let mut serie = serie_with(&[1.0], LabelStyle::shown());
        serie.icon_style = Some(IconStyle {
            show: true,
            width: 12.0,
            height: 8.0,
            ..IconStyle::default()
        });
        let (mut pool, chart) = rebuilt(&mut serie);
        let handle = serie.data[0].label_object.unwrap();
        assert!(pool.label(handle).unwrap().icon_active);
        assert_eq!(pool.label(handle).unwrap().icon_size, (12.0, 8.0));

        serie.icon_style.as_mut().unwrap().show = false;
        refresh_labels(&serie, &mut pool, &chart, &PointAnchor);
        assert!(!pool.label(handle).unwrap().icon_active);
    }
}
