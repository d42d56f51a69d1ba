//! Series data model
//!
//! This module defines the series, data points, style records and dirty flags
//! the engine reads every frame. Chart configuration owns these values; the
//! engine only writes the UI-state fields (highlight, visibility, label
//! bindings, dirty flags) it is responsible for.

use crate::layout::LayoutPoint;
use crate::pool::LabelHandle;
use crate::tooltip::SerieParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// RGBA color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (fully opaque)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// True for the "unset" sentinel: fully transparent black
    pub fn is_clear(&self) -> bool {
        *self == Color::CLEAR
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const CLEAR: Color = Color::rgba(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::CLEAR
    }
}

/// Kind of series; only affects label behavior that depends on the shape
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SerieType {
    #[default]
    Line,
    Bar,
    Pie,
    Scatter,
    Other,
}

/// Position of a label relative to its data point
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LabelPosition {
    Inside,
    #[default]
    Outside,
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

/// Text styling shared by labels and titles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextStyle {
    /// Text color; `Color::CLEAR` means "use the theme"
    pub color: Color,
    /// Label background color
    pub background_color: Color,
    pub font_size: f64,
    /// Rotation in degrees
    pub rotate: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::CLEAR,
            background_color: Color::CLEAR,
            font_size: 14.0,
            rotate: 0.0,
        }
    }
}

/// Data label configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelStyle {
    pub show: bool,
    pub position: LabelPosition,
    /// Offset added to the label anchor
    pub offset: LayoutPoint,
    /// Negate the offset for points in a trough of a line series
    pub auto_offset: bool,
    /// Content template; empty means the default value text
    pub formatter: String,
    pub numeric_formatter: String,
    pub text_style: TextStyle,
    /// Horizontal and vertical padding
    pub padding: (f64, f64),
    pub background_width: f64,
    pub background_height: f64,
    /// Structural change pending: labels must be recreated, not updated
    #[serde(skip)]
    pub component_dirty: bool,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            show: false,
            position: LabelPosition::Outside,
            offset: LayoutPoint::ZERO,
            auto_offset: false,
            formatter: String::new(),
            numeric_formatter: String::new(),
            text_style: TextStyle::default(),
            padding: (2.0, 2.0),
            background_width: 0.0,
            background_height: 0.0,
            component_dirty: false,
        }
    }
}

impl LabelStyle {
    /// A visible label with default styling
    pub fn shown() -> Self {
        Self {
            show: true,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: LabelPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = formatter.into();
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = LayoutPoint::new(x, y);
        self
    }

    pub fn with_rotate(mut self, rotate: f64) -> Self {
        self.text_style.rotate = rotate;
        self
    }

    /// Toggle visibility; this is a structural change
    pub fn set_show(&mut self, show: bool) {
        if self.show != show {
            self.show = show;
            self.component_dirty = true;
        }
    }

    pub fn set_component_dirty(&mut self) {
        self.component_dirty = true;
    }

    pub fn clear_component_dirty(&mut self) {
        self.component_dirty = false;
    }
}

/// Icon shown next to a label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IconStyle {
    pub show: bool,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    #[serde(skip)]
    pub component_dirty: bool,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            show: false,
            width: 20.0,
            height: 20.0,
            color: Color::CLEAR,
            component_dirty: false,
        }
    }
}

impl IconStyle {
    pub fn clear_component_dirty(&mut self) {
        self.component_dirty = false;
    }
}

/// Series title configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TitleStyle {
    pub show: bool,
    pub text_style: TextStyle,
    /// Offset from the series centre
    pub offset: LayoutPoint,
    #[serde(skip)]
    pub component_dirty: bool,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            show: false,
            text_style: TextStyle::default(),
            offset: LayoutPoint::ZERO,
            component_dirty: false,
        }
    }
}

impl TitleStyle {
    pub fn set_component_dirty(&mut self) {
        self.component_dirty = true;
    }

    pub fn clear_component_dirty(&mut self) {
        self.component_dirty = false;
    }
}

/// Area fill configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AreaStyle {
    pub show: bool,
}

/// Which points a series ignores when showing labels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IgnoreRule {
    /// Ignore points whose value in the checked dimension equals this value
    Value(f64),
    /// Ignore points at these flattened label indices
    Indices(BTreeSet<usize>),
}

impl IgnoreRule {
    /// Check whether the point at `index` is ignored for `dimension`
    pub fn ignores(&self, data: Option<&SerieData>, index: usize, dimension: usize) -> bool {
        match self {
            IgnoreRule::Value(value) => data
                .map(|d| d.get_data(dimension) == *value)
                .unwrap_or(false),
            IgnoreRule::Indices(indices) => indices.contains(&index),
        }
    }
}

/// Stale-state markers set by data-model mutations and cleared by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub label: bool,
    pub title: bool,
    pub name: bool,
    pub vertices: bool,
}

impl DirtyFlags {
    pub fn any(&self) -> bool {
        self.label || self.title || self.name || self.vertices
    }
}

/// Per-point state computed by the chart each update cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SerieDataContext {
    /// Point is highlighted (hovered, selected, or legend-hovered)
    pub highlight: bool,
    /// Screen position of the point
    pub position: LayoutPoint,
    /// Geometry allows a label at this point
    pub can_show_label: bool,
    /// Middle angle of the point's sector in degrees (radial layouts)
    pub half_angle: f64,
}

impl Default for SerieDataContext {
    fn default() -> Self {
        Self {
            highlight: false,
            position: LayoutPoint::ZERO,
            can_show_label: true,
            half_angle: 0.0,
        }
    }
}

/// One data point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerieData {
    pub name: String,
    /// Value dimensions; dimension 0 is usually the x/category value
    pub values: Vec<f64>,
    /// Indices of child points in the same series
    #[serde(default)]
    pub children: Vec<usize>,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub label: Option<LabelStyle>,
    #[serde(default)]
    pub emphasis_label: Option<LabelStyle>,
    #[serde(default)]
    pub icon_style: Option<IconStyle>,
    #[serde(default)]
    pub item_formatter: Option<String>,
    #[serde(default)]
    pub numeric_formatter: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    /// Position in the flattened label order, reassigned on every rebuild
    #[serde(skip)]
    pub index: usize,
    #[serde(skip)]
    pub label_object: Option<LabelHandle>,
    #[serde(skip)]
    pub context: SerieDataContext,
}

fn default_true() -> bool {
    true
}

impl SerieData {
    /// Create a data point with a name and values
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            children: Vec::new(),
            show: true,
            label: None,
            emphasis_label: None,
            icon_style: None,
            item_formatter: None,
            numeric_formatter: None,
            marker: None,
            index: 0,
            label_object: None,
            context: SerieDataContext::default(),
        }
    }

    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    pub fn with_label(mut self, label: LabelStyle) -> Self {
        self.label = Some(label);
        self
    }

    /// Value of a dimension, 0 when the dimension is missing
    pub fn get_data(&self, dimension: usize) -> f64 {
        self.values.get(dimension).copied().unwrap_or(0.0)
    }
}

/// Transient state the engine and chart share during an update cycle
#[derive(Debug, Clone, Default)]
pub struct SerieContext {
    /// Point currently targeted by the pointer or tooltip
    pub pointer_item_data_index: Option<usize>,
    /// Reused tooltip parameter record
    pub param: SerieParams,
    /// Layout centre computed by the last label rebuild
    pub center: LayoutPoint,
}

/// A named series of data points plus its style configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serie {
    pub index: usize,
    pub serie_name: String,
    pub serie_type: SerieType,
    #[serde(default = "default_true")]
    pub show: bool,
    /// Each data point is its own legend entry
    #[serde(default)]
    pub use_data_name_for_color: bool,
    /// Large-data mode: no per-point labels
    #[serde(default)]
    pub performance_mode: bool,
    #[serde(default)]
    pub label: Option<LabelStyle>,
    #[serde(default)]
    pub emphasis_label: Option<LabelStyle>,
    #[serde(default)]
    pub icon_style: Option<IconStyle>,
    #[serde(default)]
    pub title_style: TitleStyle,
    #[serde(default)]
    pub area_style: Option<AreaStyle>,
    #[serde(default)]
    pub item_formatter: Option<String>,
    #[serde(default)]
    pub numeric_formatter: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    /// Layout centre as `[x, y]`; ratios when <= 1, pixels otherwise
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default)]
    pub ignore: Option<IgnoreRule>,
    /// Value dimension shown by labels; edits to it invalidate label content
    #[serde(default = "default_label_dimension")]
    pub label_dimension: usize,
    #[serde(default)]
    pub data: Vec<SerieData>,
    #[serde(skip)]
    pub dirty: DirtyFlags,
    #[serde(skip)]
    pub context: SerieContext,
}

fn default_center() -> [f64; 2] {
    [0.5, 0.5]
}

fn default_label_dimension() -> usize {
    1
}

impl Serie {
    /// Create an empty series
    pub fn new(index: usize, name: impl Into<String>, serie_type: SerieType) -> Self {
        Self {
            index,
            serie_name: name.into(),
            serie_type,
            show: true,
            use_data_name_for_color: false,
            performance_mode: false,
            label: None,
            emphasis_label: None,
            icon_style: None,
            title_style: TitleStyle::default(),
            area_style: None,
            item_formatter: None,
            numeric_formatter: None,
            marker: None,
            center: default_center(),
            ignore: None,
            label_dimension: default_label_dimension(),
            data: Vec::new(),
            dirty: DirtyFlags::default(),
            context: SerieContext::default(),
        }
    }

    pub fn with_label(mut self, label: LabelStyle) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_emphasis_label(mut self, label: LabelStyle) -> Self {
        self.emphasis_label = Some(label);
        self
    }

    pub fn with_data(mut self, data: Vec<SerieData>) -> Self {
        self.data = data;
        self.dirty.label = true;
        self.dirty.vertices = true;
        self
    }

    /// Name shown in the legend for this series
    pub fn legend_name(&self) -> String {
        if self.serie_name.is_empty() {
            format!("serie{}", self.index)
        } else {
            self.serie_name.clone()
        }
    }

    pub fn is_legend_name(&self, name: &str) -> bool {
        self.legend_name() == name
    }

    /// True when some data point is its own legend entry named `name`
    pub fn is_serie_data_legend_name(&self, name: &str) -> bool {
        self.data.iter().any(|d| d.name == name)
    }

    pub fn is_performance_mode(&self) -> bool {
        self.performance_mode
    }

    pub fn data_count(&self) -> usize {
        self.data.len()
    }

    pub fn get_serie_data(&self, index: usize) -> Option<&SerieData> {
        self.data.get(index)
    }

    pub fn get_serie_data_mut(&mut self, index: usize) -> Option<&mut SerieData> {
        self.data.get_mut(index)
    }

    /// Check the series' ignore rule for a point. Index rules match the
    /// point's flattened label index, value rules its own value.
    pub fn is_ignore_data(&self, data: &SerieData, dimension: usize) -> bool {
        self.ignore
            .as_ref()
            .is_some_and(|rule| rule.ignores(Some(data), data.index, dimension))
    }

    /// Label style in effect for a point (point override, else series)
    pub fn label_for<'a>(&'a self, data: &'a SerieData) -> Option<&'a LabelStyle> {
        data.label.as_ref().or(self.label.as_ref())
    }

    /// Emphasis label style in effect for a point
    pub fn emphasis_label_for<'a>(&'a self, data: &'a SerieData) -> Option<&'a LabelStyle> {
        data.emphasis_label.as_ref().or(self.emphasis_label.as_ref())
    }

    /// Icon style in effect for a point
    pub fn icon_style_for<'a>(&'a self, data: &'a SerieData) -> Option<&'a IconStyle> {
        data.icon_style.as_ref().or(self.icon_style.as_ref())
    }

    /// True when any label style of the series has a structural change pending
    pub fn label_component_dirty(&self) -> bool {
        let dirty = |label: &Option<LabelStyle>| label.as_ref().is_some_and(|l| l.component_dirty);
        dirty(&self.label)
            || dirty(&self.emphasis_label)
            || self.icon_style.as_ref().is_some_and(|i| i.component_dirty)
    }

    /// Clear structural-dirty on every label style of the series
    pub fn clear_label_component_dirty(&mut self) {
        if let Some(label) = self.label.as_mut() {
            label.clear_component_dirty();
        }
        if let Some(label) = self.emphasis_label.as_mut() {
            label.clear_component_dirty();
        }
        if let Some(icon) = self.icon_style.as_mut() {
            icon.clear_component_dirty();
        }
    }

    /// Sum of a dimension over visible points
    pub fn data_total(&self, dimension: usize) -> f64 {
        self.data
            .iter()
            .filter(|d| d.show)
            .map(|d| d.get_data(dimension))
            .sum()
    }

    /// Total of the y dimension
    pub fn y_total(&self) -> f64 {
        self.data_total(1)
    }

    /// Largest value of a dimension, 0 for an empty series
    pub fn max_data(&self, dimension: usize) -> f64 {
        self.data
            .iter()
            .map(|d| d.get_data(dimension))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }

    /// True when the point sits lower than its neighbours in its line.
    ///
    /// The first and last points compare against their only neighbour.
    pub fn is_down_point(&self, index: usize, dimension: usize) -> bool {
        let count = self.data.len();
        if count < 2 || index >= count {
            return false;
        }
        let value = |i: usize| self.data[i].get_data(dimension);
        let current = value(index);
        if index == 0 {
            current < value(1)
        } else if index == count - 1 {
            current < value(index - 1)
        } else {
            current < value(index - 1) && current < value(index + 1)
        }
    }

    /// Append a data point
    pub fn add_data(&mut self, data: SerieData) {
        self.data.push(data);
        self.dirty.vertices = true;
        self.dirty.label = true;
        if self.data.len() == 1 {
            self.dirty.title = true;
        }
    }

    /// Remove every data point
    pub fn clear_data(&mut self) {
        self.data.clear();
        self.dirty.vertices = true;
        self.dirty.label = true;
        self.dirty.title = true;
    }

    /// Update one value of a point. Returns false if the point does not exist.
    pub fn update_data(&mut self, index: usize, dimension: usize, value: f64) -> bool {
        let Some(data) = self.data.get_mut(index) else {
            return false;
        };
        if data.values.len() <= dimension {
            data.values.resize(dimension + 1, 0.0);
        }
        data.values[dimension] = value;
        self.dirty.vertices = true;
        if dimension == self.label_dimension {
            self.dirty.label = true;
        }
        true
    }

    /// Rename a point. Returns false if the point does not exist.
    pub fn set_data_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        let Some(data) = self.data.get_mut(index) else {
            return false;
        };
        data.name = name.into();
        self.dirty.label = true;
        self.dirty.vertices = true;
        if index == 0 {
            self.dirty.title = true;
        }
        if self.use_data_name_for_color {
            self.dirty.name = true;
        }
        true
    }

    /// Rename the series
    pub fn set_serie_name(&mut self, name: impl Into<String>) {
        self.serie_name = name.into();
        self.dirty.name = true;
    }

    pub fn set_vertices_dirty(&mut self) {
        self.dirty.vertices = true;
    }

    pub fn set_all_dirty(&mut self) {
        self.dirty = DirtyFlags {
            label: true,
            title: true,
            name: true,
            vertices: true,
        };
    }
}
