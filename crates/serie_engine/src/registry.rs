//! Engines for every series of a chart
//!
//! The registry pairs each series with its own engine and label pool, so a
//! failure in one series never blocks the others within a tick.

use crate::config::EngineConfig;
use crate::engine::{FrameReport, SerieUpdateEngine};
use crate::error::{EngineError, EngineResult};
use crate::host::ChartHost;
use crate::legend::LegendBinding;
use crate::model::Serie;
use crate::stats::UpdateStats;
use crate::tooltip::{SerieParams, TooltipOutcome, TooltipRequest};

struct Entry {
    serie: Serie,
    engine: SerieUpdateEngine,
}

/// All series of a chart with their engines, in series order
pub struct SerieRegistry {
    config: EngineConfig,
    entries: Vec<Entry>,
}

impl Default for SerieRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SerieRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// Load series from a JSON array
    pub fn from_json(config: EngineConfig, json: &str) -> EngineResult<Self> {
        let series: Vec<Serie> = serde_json::from_str(json)?;
        let mut registry = Self::new(config);
        for serie in series {
            registry.add_serie(serie)?;
        }
        Ok(registry)
    }

    /// Add a series. Its index must be unique within the chart.
    pub fn add_serie(&mut self, mut serie: Serie) -> EngineResult<()> {
        if self.entries.iter().any(|e| e.serie.index == serie.index) {
            return Err(EngineError::InvalidData(format!(
                "duplicate serie index {}",
                serie.index
            )));
        }
        let mut engine = SerieUpdateEngine::with_config(self.config.clone());
        engine.set_serie(&mut serie);
        tracing::debug!(
            target: "serie_engine::engine",
            serie = serie.index,
            points = serie.data_count(),
            "serie registered"
        );
        self.entries.push(Entry { serie, engine });
        Ok(())
    }

    /// Remove a series and its visuals
    pub fn remove_serie(&mut self, index: usize) -> Option<Serie> {
        let position = self.entries.iter().position(|e| e.serie.index == index)?;
        let mut entry = self.entries.remove(position);
        entry.engine.remove_component();
        Some(entry.serie)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serie(&self, index: usize) -> Option<&Serie> {
        self.entry(index).map(|e| &e.serie)
    }

    pub fn serie_mut(&mut self, index: usize) -> Option<&mut Serie> {
        self.entries
            .iter_mut()
            .find(|e| e.serie.index == index)
            .map(|e| &mut e.serie)
    }

    pub fn engine(&self, index: usize) -> Option<&SerieUpdateEngine> {
        self.entry(index).map(|e| &e.engine)
    }

    fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.iter().find(|e| e.serie.index == index)
    }

    /// Advance every series by one tick
    pub fn advance_frame(&mut self, host: &mut dyn ChartHost) -> Vec<(usize, FrameReport)> {
        let mut reports = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter_mut() {
            let report = entry.engine.advance_frame(&mut entry.serie, host);
            reports.push((entry.serie.index, report));
        }
        reports
    }

    /// Value refresh of every initialised series. Returns the labels shown.
    pub fn refresh_labels(&mut self, host: &dyn ChartHost) -> usize {
        self.entries
            .iter_mut()
            .filter(|e| e.engine.state().labels_initialized)
            .map(|e| e.engine.refresh_labels(&e.serie, host))
            .sum()
    }

    /// Deliver a legend click to every series; returns the bindings it matched
    pub fn on_legend_click(
        &mut self,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
        show: bool,
    ) -> Vec<LegendBinding> {
        let mut bindings = Vec::new();
        for entry in self.entries.iter_mut() {
            bindings.extend(entry.engine.on_legend_click(
                &mut entry.serie,
                host,
                legend_index,
                legend_name,
                show,
            ));
        }
        bindings
    }

    pub fn on_legend_enter(
        &mut self,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
    ) -> Vec<LegendBinding> {
        let mut bindings = Vec::new();
        for entry in self.entries.iter_mut() {
            bindings.extend(entry.engine.on_legend_enter(
                &mut entry.serie,
                host,
                legend_index,
                legend_name,
            ));
        }
        bindings
    }

    pub fn on_legend_exit(
        &mut self,
        host: &mut dyn ChartHost,
        legend_index: usize,
        legend_name: &str,
    ) -> Vec<LegendBinding> {
        let mut bindings = Vec::new();
        for entry in self.entries.iter_mut() {
            bindings.extend(entry.engine.on_legend_exit(
                &mut entry.serie,
                host,
                legend_index,
                legend_name,
            ));
        }
        bindings
    }

    /// Collect tooltip parameters from every visible series. Returns the
    /// number of series that contributed.
    pub fn build_tooltip_params(
        &mut self,
        host: &dyn ChartHost,
        request: &TooltipRequest<'_>,
        params: &mut Vec<SerieParams>,
        title: &mut String,
    ) -> usize {
        let mut appended = 0;
        for entry in self.entries.iter_mut().filter(|e| e.serie.show) {
            let Entry { serie, engine } = entry;
            let outcome = engine.build_tooltip_params(serie, host, request, params, title);
            if outcome == TooltipOutcome::Appended {
                appended += 1;
            }
        }
        appended
    }

    /// Counters summed over every engine
    pub fn total_stats(&self) -> UpdateStats {
        let mut total = UpdateStats::default();
        for entry in &self.entries {
            total.merge(entry.engine.stats());
        }
        total
    }
}
