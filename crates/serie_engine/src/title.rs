//! Series title binder
//!
//! One title visual per series, created on first use and updated in place on
//! every later rebuild.

use crate::config::EngineConfig;
use crate::host::ChartHost;
use crate::layout::LayoutPoint;
use crate::model::{Color, Serie};

/// The on-screen title of a series
#[derive(Debug, Clone, PartialEq)]
pub struct TitleObject {
    pub name: String,
    pub text: String,
    pub color: Color,
    pub font_size: f64,
    /// Width and height of the title box
    pub size: (f64, f64),
    pub position: LayoutPoint,
    pub active: bool,
}

impl TitleObject {
    fn new(config: &EngineConfig) -> Self {
        Self {
            name: "title".to_string(),
            text: String::new(),
            color: Color::BLACK,
            font_size: config.title_font_size,
            size: (config.title_width, config.title_font_size + 2.0),
            position: LayoutPoint::ZERO,
            active: false,
        }
    }
}

/// Create the title if needed and bring it up to date. Returns true when the
/// title was created by this call.
pub fn rebuild_title(
    title: &mut Option<TitleObject>,
    serie: &Serie,
    host: &dyn ChartHost,
    config: &EngineConfig,
) -> bool {
    let created = title.is_none();
    let object = title.get_or_insert_with(|| TitleObject::new(config));

    let theme = host.theme();
    let style = &serie.title_style;
    object.color = if theme.is_clear(style.text_style.color) {
        theme.palette_color(serie.index)
    } else {
        style.text_style.color
    };
    object.text = serie
        .get_serie_data(0)
        .map(|d| d.name.clone())
        .unwrap_or_default();
    object.active = style.show;
    object.position = serie.context.center + style.offset;

    tracing::debug!(
        target: "serie_engine::title",
        serie = serie.index,
        created,
        active = object.active,
        "title rebuilt"
    );
    created
}
