//! Chart host interface
//!
//! The engine never talks to the renderer directly. Everything it needs from
//! the surrounding chart (bounds, theme, formatting, repaint signals) goes
//! through [`ChartHost`]. [`Chart`] is an in-memory host that records every
//! request, used by headless drivers and tests.

use crate::format::{DefaultFormatter, ValueFormatter};
use crate::layout::{CenterLayout, LayoutRect, SerieLayout};
use crate::theme::{Theme, ThemeProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chart-level components the engine can invalidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Legend,
    Tooltip,
    Title,
}

/// A repaint signal sent to the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaintRequest {
    /// Repaint the whole chart
    Chart,
    /// Repaint one series' painter only
    Serie(usize),
}

/// Services the chart provides to the engine
pub trait ChartHost {
    /// Bounds of the chart's drawing area
    fn chart_bounds(&self) -> LayoutRect;

    fn theme(&self) -> &dyn ThemeProvider;

    fn formatter(&self) -> &dyn ValueFormatter;

    fn layout(&self) -> &dyn SerieLayout;

    /// Request a repaint of one series, or of the whole chart when `None`
    fn request_repaint(&mut self, serie: Option<usize>);

    /// Mark every component of a kind as needing a full redraw
    fn mark_component_dirty(&mut self, kind: ComponentKind);

    /// Show a legend entry as active or inactive
    fn update_legend_color(&mut self, legend_name: &str, active: bool);
}

/// In-memory [`ChartHost`]
#[derive(Debug, Clone)]
pub struct Chart {
    pub bounds: LayoutRect,
    pub theme: Theme,
    pub formatter: DefaultFormatter,
    /// Components present on the chart
    pub components: Vec<ComponentKind>,
    repaints: Vec<RepaintRequest>,
    dirty_components: Vec<ComponentKind>,
    legend_active: HashMap<String, bool>,
}

impl Default for Chart {
    fn default() -> Self {
        Self::new(LayoutRect::new(0.0, 0.0, 400.0, 300.0))
    }
}

impl Chart {
    /// Create a chart with a legend and a tooltip component
    pub fn new(bounds: LayoutRect) -> Self {
        Self {
            bounds,
            theme: Theme::default(),
            formatter: DefaultFormatter::default(),
            components: vec![ComponentKind::Legend, ComponentKind::Tooltip],
            repaints: Vec::new(),
            dirty_components: Vec::new(),
            legend_active: HashMap::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Repaint requests received so far, oldest first
    pub fn repaints(&self) -> &[RepaintRequest] {
        &self.repaints
    }

    /// Number of repaint requests scoped to one series
    pub fn serie_repaint_count(&self, serie: usize) -> usize {
        self.repaints
            .iter()
            .filter(|r| **r == RepaintRequest::Serie(serie))
            .count()
    }

    /// Number of whole-chart repaint requests
    pub fn chart_repaint_count(&self) -> usize {
        self.repaints
            .iter()
            .filter(|r| **r == RepaintRequest::Chart)
            .count()
    }

    pub fn is_component_dirty(&self, kind: ComponentKind) -> bool {
        self.dirty_components.contains(&kind)
    }

    /// Legend entry state set through `update_legend_color`
    pub fn legend_active(&self, legend_name: &str) -> Option<bool> {
        self.legend_active.get(legend_name).copied()
    }

    /// Drain recorded requests, as a renderer does after painting
    pub fn take_repaints(&mut self) -> Vec<RepaintRequest> {
        self.dirty_components.clear();
        std::mem::take(&mut self.repaints)
    }
}

impl ChartHost for Chart {
    fn chart_bounds(&self) -> LayoutRect {
        self.bounds
    }

    fn theme(&self) -> &dyn ThemeProvider {
        &self.theme
    }

    fn formatter(&self) -> &dyn ValueFormatter {
        &self.formatter
    }

    fn layout(&self) -> &dyn SerieLayout {
        &CenterLayout
    }

    fn request_repaint(&mut self, serie: Option<usize>) {
        let request = match serie {
            Some(index) => RepaintRequest::Serie(index),
            None => RepaintRequest::Chart,
        };
        tracing::trace!(target: "serie_engine::host", ?request, "repaint requested");
        self.repaints.push(request);
    }

    fn mark_component_dirty(&mut self, kind: ComponentKind) {
        if self.components.contains(&kind) && !self.dirty_components.contains(&kind) {
            self.dirty_components.push(kind);
        }
    }

    fn update_legend_color(&mut self, legend_name: &str, active: bool) {
        self.legend_active.insert(legend_name.to_string(), active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repaint_recording() {
        let mut chart = Chart::default();
        chart.request_repaint(Some(2));
        chart.request_repaint(None);
        chart.request_repaint(Some(2));
        assert_eq!(chart.serie_repaint_count(2), 2);
        assert_eq!(chart.chart_repaint_count(), 1);
        assert_eq!(chart.take_repaints().len(), 3);
        assert!(chart.repaints().is_empty());
    }

    #[test]
    fn test_mark_component_dirty_only_present() {
        let mut chart = Chart::default();
        chart.mark_component_dirty(ComponentKind::Legend);
        chart.mark_component_dirty(ComponentKind::Title);
        assert!(chart.is_component_dirty(ComponentKind::Legend));
        assert!(!chart.is_component_dirty(ComponentKind::Title));
    }

    #[test]
    fn test_legend_color_state() {
        let mut chart = Chart::default();
        assert_eq!(chart.legend_active("Sales"), None);
        chart.update_legend_color("Sales", false);
        assert_eq!(chart.legend_active("Sales"), Some(false));
    }
}
