//! Per-series update engine
//!
//! [`SerieUpdateEngine`] owns the visual state of one series: its root, its
//! pooled labels and its title. The host calls [`SerieUpdateEngine::advance_frame`]
//! once per render tick; the engine turns the series' dirty flags into label
//! rebuilds, title rebuilds and repaint requests, in that order.
//!
//! A flag is cleared only after its handler succeeded. A failed label rebuild
//! is logged and retried on the next tick.

use crate::config::EngineConfig;
use crate::host::{ChartHost, ComponentKind};
use crate::label::{self, LabelAnchor, PointAnchor};
use crate::legend::{self, LegendBinding};
use crate::model::Serie;
use crate::pool::{LabelPool, VisualPool};
use crate::stats::UpdateStats;
use crate::title::{self, TitleObject};
use crate::tooltip::{self, SerieParams, TooltipOutcome, TooltipRequest};

/// Lifecycle of a series' visuals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Ready,
}

/// Container owning every on-screen element of a series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualRoot {
    pub name: String,
    pub active: bool,
}

/// Per-series state record kept between ticks
#[derive(Debug, Clone, Default)]
pub struct SerieState {
    pub lifecycle: Lifecycle,
    pub root: Option<VisualRoot>,
    pub title: Option<TitleObject>,
    /// The last label rebuild succeeded
    pub labels_initialized: bool,
    /// A value refresh was requested for the next tick
    pub refresh_pending: bool,
    /// The series' legend entry is hovered
    pub legend_hovered: bool,
}

/// Steps that ran during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub initialized: bool,
    pub labels_refreshed: bool,
    pub labels_rebuilt: bool,
    /// A label rebuild ran and failed; the label flag stays set
    pub label_rebuild_failed: bool,
    pub title_rebuilt: bool,
    pub name_handled: bool,
    pub vertices_handled: bool,
}

/// Drives the visuals of one series from its dirty flags
pub struct SerieUpdateEngine<P: VisualPool = LabelPool> {
    config: EngineConfig,
    pool: P,
    state: SerieState,
    anchor: Box<dyn LabelAnchor>,
    stats: UpdateStats,
}

impl Default for SerieUpdateEngine<LabelPool> {
    fn default() -> Self {
        Self::new()
    }
}

impl SerieUpdateEngine<LabelPool> {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine whose label pool honours the configured capacity
    pub fn with_config(config: EngineConfig) -> Self {
        let mut pool = LabelPool::new();
        pool.set_capacity_limit(config.pool_capacity);
        Self::with_pool(config, pool)
    }
}

impl<P: VisualPool> SerieUpdateEngine<P> {
    /// Create an engine around a host-provided pool
    pub fn with_pool(config: EngineConfig, pool: P) -> Self {
        Self {
            config,
            pool,
            state: SerieState::default(),
            anchor: Box::new(PointAnchor),
            stats: UpdateStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SerieState {
        &self.state
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    /// Replace how labels are anchored, e.g. for radial layouts
    pub fn set_label_anchor(&mut self, anchor: impl LabelAnchor + 'static) {
        self.anchor = Box::new(anchor);
    }

    /// Bind the engine to a (new) series. Everything is rebuilt on the next tick.
    pub fn set_serie(&mut self, serie: &mut Serie) {
        self.pool.release_all();
        for data in serie.data.iter_mut() {
            data.label_object = None;
        }
        self.state = SerieState::default();
        serie.set_all_dirty();
        tracing::debug!(target: "serie_engine::engine", serie = serie.index, "serie bound");
    }

    /// Initialise the root, labels and title once. Returns true when this call
    /// did the initialisation.
    pub fn init_component(&mut self, serie: &mut Serie, host: &dyn ChartHost) -> bool {
        if self.state.lifecycle == Lifecycle::Ready {
            return false;
        }
        self.state.root = Some(VisualRoot {
            name: format!("{}_{}", self.config.root_object_prefix, serie.index),
            active: true,
        });
        if self.rebuild_labels(serie, host) {
            serie.dirty.label = false;
            serie.clear_label_component_dirty();
        } else {
            serie.dirty.label = true;
        }
        self.rebuild_title(serie, host);
        serie.dirty.title = false;
        serie.title_style.clear_component_dirty();

        self.state.lifecycle = Lifecycle::Ready;
        self.stats.record_init(serie.index);
        tracing::debug!(
            target: "serie_engine::engine",
            serie = serie.index,
            labels = self.pool.live_count(),
            "component initialised"
        );
        true
    }

    /// Hide the series' root and title
    pub fn remove_component(&mut self) {
        if let Some(root) = self.state.root.as_mut() {
            root.active = false;
        }
        if let Some(title) = self.state.title.as_mut() {
            title.active = false;
        }
    }

    /// Run a value refresh on the next tick
    pub fn refresh_label_next_frame(&mut self) {
        self.state.refresh_pending = true;
    }

    /// Update the existing labels in place. Returns the number shown.
    pub fn refresh_labels(&mut self, serie: &Serie, host: &dyn ChartHost) -> usize {
        let shown = label::refresh_labels(serie, &mut self.pool, host, self.anchor.as_ref());
        self.stats.record_label_refresh(serie.index, shown);
        shown
    }

    /// Process one render tick for the series
    pub fn advance_frame(&mut self, serie: &mut Serie, host: &mut dyn ChartHost) -> FrameReport {
        let mut report = FrameReport::default();
        self.stats.record_frame();

        if self.state.lifecycle == Lifecycle::Uninitialized {
            report.initialized = self.init_component(serie, &*host);
        }

        if self.state.refresh_pending && self.state.labels_initialized {
            self.refresh_labels(serie, &*host);
            self.state.refresh_pending = false;
            report.labels_refreshed = true;
        }

        // A failed rebuild during initialisation is retried on the next tick
        if !report.initialized && (serie.dirty.label || serie.label_component_dirty()) {
            if self.rebuild_labels(serie, &*host) {
                serie.dirty.label = false;
                serie.clear_label_component_dirty();
                report.labels_rebuilt = true;
            } else {
                report.label_rebuild_failed = true;
            }
        }

        if serie.dirty.title || serie.title_style.component_dirty {
            self.rebuild_title(serie, &*host);
            serie.dirty.title = false;
            serie.title_style.clear_component_dirty();
            report.title_rebuilt = true;
        }

        if serie.dirty.name {
            host.mark_component_dirty(ComponentKind::Legend);
            host.request_repaint(None);
            self.stats.record_repaint();
            serie.dirty.name = false;
            report.name_handled = true;
        }

        if serie.dirty.vertices {
            host.request_repaint(Some(serie.index));
            self.stats.record_repaint();
            serie.dirty.vertices = false;
            report.vertices_handled = true;
        }

        tracing::trace!(
            target: "serie_engine::engine",
            serie = serie.index,
            frame = self.stats.frames,
            ?report,
            "frame advanced"
        );
        report
    }

    pub fn on_legend_click(
        &mut self,
        serie: &mut Serie,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
        show: bool,
    ) -> Option<LegendBinding> {
        let binding = legend::on_legend_click(
            serie,
            host,
            legend_index,
            legend_name,
            show,
            self.state.legend_hovered,
        );
        if binding.is_some() {
            self.stats.record_repaint();
        }
        binding
    }

    pub fn on_legend_enter(
        &mut self,
        serie: &mut Serie,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
    ) -> Option<LegendBinding> {
        let binding = legend::on_legend_enter(
            serie,
            host,
            legend_index,
            legend_name,
            &mut self.state.legend_hovered,
        );
        if binding.is_some() {
            self.stats.record_repaint();
        }
        binding
    }

    pub fn on_legend_exit(
        &mut self,
        serie: &mut Serie,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
    ) -> Option<LegendBinding> {
        let binding = legend::on_legend_exit(
            serie,
            host,
            legend_index,
            legend_name,
            &mut self.state.legend_hovered,
        );
        if binding.is_some() {
            self.stats.record_repaint();
        }
        binding
    }

    /// Append this series' tooltip parameters
    pub fn build_tooltip_params(
        &self,
        serie: &mut Serie,
        host: &dyn ChartHost,
        request: &TooltipRequest<'_>,
        params: &mut Vec<SerieParams>,
        title: &mut String,
    ) -> TooltipOutcome {
        tooltip::build_tooltip_params(serie, host, request, params, title)
    }

    fn rebuild_labels(&mut self, serie: &mut Serie, host: &dyn ChartHost) -> bool {
        match label::rebuild_labels(serie, &mut self.pool, host, &self.config) {
            Ok(summary) => {
                self.state.labels_initialized = true;
                self.stats.record_label_rebuild(serie.index, summary.created);
                true
            }
            Err(err) => {
                self.state.labels_initialized = false;
                self.stats.record_failed_rebuild(serie.index);
                tracing::warn!(
                    target: "serie_engine::engine",
                    serie = serie.index,
                    error = %err,
                    "label rebuild failed, retrying next frame"
                );
                false
            }
        }
    }

    fn rebuild_title(&mut self, serie: &Serie, host: &dyn ChartHost) {
        title::rebuild_title(&mut self.state.title, serie, host, &self.config);
        self.stats.record_title_rebuild();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Chart, RepaintRequest};
    use crate::model::{LabelStyle, SerieData, SerieType};

    fn serie(count: usize) -> Serie {
        let data = (0..count)
            .map(|i| SerieData::new(format!("p{}", i), vec![i as f64, 10.0 * (i + 1) as f64]))
            .collect();
        Serie::new(0, "Sales", SerieType::Line)
            .with_label(LabelStyle::shown())
            .with_data(data)
    }

    #[test]
    fn test_first_frame_initialises() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(3);

        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.initialized);
        assert!(!report.labels_rebuilt);
        assert!(report.vertices_handled);
        assert_eq!(engine.state().lifecycle, Lifecycle::Ready);
        assert_eq!(
            engine.state().root,
            Some(VisualRoot {
                name: "serie_0".to_string(),
                active: true
            })
        );
        assert!(engine.state().title.is_some());
        assert!(engine.state().labels_initialized);
        assert_eq!(engine.pool().live_count(), 3);
        assert!(!serie.dirty.any());
        assert_eq!(chart.repaints(), &[RepaintRequest::Serie(0)]);
    }

    #[test]
    fn test_init_is_idempotent() {
        let chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        assert!(engine.init_component(&mut serie, &chart));
        let slots = engine.pool().slot_count();
        assert!(!engine.init_component(&mut serie, &chart));
        assert_eq!(engine.pool().slot_count(), slots);
        assert_eq!(engine.pool().live_count(), 2);
        assert_eq!(engine.stats().inits, 1);
    }

    #[test]
    fn test_clean_frame_does_nothing() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.advance_frame(&mut serie, &mut chart);
        chart.take_repaints();

        let report = engine.advance_frame(&mut serie, &mut chart);
        assert_eq!(report, FrameReport::default());
        assert!(chart.repaints().is_empty());
    }

    #[test]
    fn test_step_order_within_frame() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.advance_frame(&mut serie, &mut chart);
        chart.take_repaints();

        serie.set_all_dirty();
        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.labels_rebuilt && report.title_rebuilt);
        assert!(report.name_handled && report.vertices_handled);
        assert!(chart.is_component_dirty(ComponentKind::Legend));
        assert_eq!(
            chart.repaints(),
            &[RepaintRequest::Chart, RepaintRequest::Serie(0)]
        );
        assert!(!serie.dirty.any());
    }

    #[test]
    fn test_component_dirty_forces_rebuild() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.advance_frame(&mut serie, &mut chart);

        serie.emphasis_label = Some(LabelStyle::default());
        if let Some(label) = serie.emphasis_label.as_mut() {
            label.set_component_dirty();
        }
        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.labels_rebuilt);
        assert!(!serie.label_component_dirty());
        assert_eq!(engine.stats().label_rebuilds, 2);
    }

    #[test]
    fn test_failed_rebuild_keeps_flag() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::with_config(EngineConfig::default().with_pool_capacity(2));
        let mut serie = serie(3);

        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.initialized);
        assert!(!engine.state().labels_initialized);
        assert!(serie.dirty.label);
        assert_eq!(engine.pool().live_count(), 0);
        assert!(serie.data.iter().all(|d| d.label_object.is_none()));
        // Remaining steps still ran
        assert!(report.vertices_handled);

        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.label_rebuild_failed);
        assert!(serie.dirty.label);

        engine.pool_mut().set_capacity_limit(None);
        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.labels_rebuilt);
        assert!(!serie.dirty.label);
        assert_eq!(engine.pool().live_count(), 3);
        assert_eq!(engine.stats().failed_rebuilds, 2);
    }

    #[test]
    fn test_refresh_next_frame() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.refresh_label_next_frame();
        let report = engine.advance_frame(&mut serie, &mut chart);
        // Labels were initialised earlier in the same tick
        assert!(report.labels_refreshed);
        assert!(!engine.state().refresh_pending);

        let slots = engine.pool().slot_count();
        serie.update_data(0, 0, 4.0);
        engine.refresh_label_next_frame();
        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.labels_refreshed);
        assert!(!report.labels_rebuilt);
        assert_eq!(engine.pool().slot_count(), slots);
    }

    #[test]
    fn test_refresh_updates_text() {
        let chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.init_component(&mut serie, &chart);
        assert_eq!(engine.refresh_labels(&serie, &chart), 2);
        let handle = serie.data[1].label_object.unwrap();
        assert_eq!(engine.pool().label(handle).unwrap().text, "20");
    }

    #[test]
    fn test_label_dimension_drives_dirty_and_text() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = Serie::new(0, "Sizes", SerieType::Scatter)
            .with_label(LabelStyle::shown())
            .with_data(vec![SerieData::new("a", vec![0.0, 1.0, 30.0])]);
        serie.label_dimension = 2;
        engine.advance_frame(&mut serie, &mut chart);
        assert_eq!(engine.refresh_labels(&serie, &chart), 1);
        let handle = serie.data[0].label_object.unwrap();
        assert_eq!(engine.pool().label(handle).unwrap().text, "30");

        assert!(serie.update_data(0, 1, 5.0));
        assert!(!serie.dirty.label);
        assert!(serie.update_data(0, 2, 45.0));
        assert!(serie.dirty.label);

        let report = engine.advance_frame(&mut serie, &mut chart);
        assert!(report.labels_rebuilt);
        engine.refresh_labels(&serie, &chart);
        let handle = serie.data[0].label_object.unwrap();
        assert_eq!(engine.pool().label(handle).unwrap().text, "45");
    }

    #[test]
    fn test_set_serie_resets() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(2);
        engine.advance_frame(&mut serie, &mut chart);

        let mut other = Serie::new(0, "Costs", SerieType::Bar)
            .with_data(vec![SerieData::new("a", vec![0.0, 1.0])]);
        engine.set_serie(&mut other);
        assert_eq!(engine.state().lifecycle, Lifecycle::Uninitialized);
        assert_eq!(engine.pool().live_count(), 0);
        assert!(other.dirty.name);

        let report = engine.advance_frame(&mut other, &mut chart);
        assert!(report.initialized);
        assert!(report.name_handled);
    }

    #[test]
    fn test_remove_component_hides_root() {
        let chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(1);
        serie.title_style.show = true;
        engine.init_component(&mut serie, &chart);
        engine.remove_component();
        assert!(!engine.state().root.as_ref().unwrap().active);
        assert!(!engine.state().title.as_ref().unwrap().active);
    }

    #[test]
    fn test_legend_hover_flag() {
        let mut chart = Chart::default();
        let mut engine = SerieUpdateEngine::new();
        let mut serie = serie(1);
        engine.on_legend_enter(&mut serie, &mut chart, 0, "Sales");
        assert!(engine.state().legend_hovered);
        engine.on_legend_exit(&mut serie, &mut chart, 0, "Sales");
        assert!(!engine.state().legend_hovered);
        assert_eq!(engine.stats().repaint_requests, 2);
    }
}
