//! Open Graph card rasterisation: askama SVG template → resvg → PNG.

use std::sync::Arc;

use resvg::{tiny_skia, usvg};

use crate::application::og::{OgCard, OgRenderer};
use crate::infra::error::InfraError;
use crate::presentation::views::{OgCardTemplate, OgLineView, render_template};

const TITLE_FIRST_BASELINE: u32 = 260;
const TITLE_LINE_HEIGHT: u32 = 76;
const SUBTITLE_GAP: u32 = 70;

pub struct SvgOgRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
    font_family: String,
}

impl SvgOgRenderer {
    /// Loads system fonts once; text in a family that is not installed falls
    /// back to whatever the font database resolves.
    pub fn new(font_family: impl Into<String>) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        Self {
            fontdb: Arc::new(fontdb),
            font_family: font_family.into(),
        }
    }

    pub fn svg(&self, card: &OgCard) -> Result<String, InfraError> {
        let title_lines: Vec<OgLineView> = card
            .title_lines
            .iter()
            .zip(0u32..)
            .map(|(text, index)| OgLineView {
                text: text.clone(),
                y: TITLE_FIRST_BASELINE + index * TITLE_LINE_HEIGHT,
            })
            .collect();
        let last_baseline = title_lines
            .last()
            .map(|line| line.y)
            .unwrap_or(TITLE_FIRST_BASELINE);

        let template = OgCardTemplate {
            width: card.width,
            height: card.height,
            font_family: self.font_family.clone(),
            label: card.label.clone(),
            title_lines,
            subtitle: card.subtitle.clone(),
            subtitle_y: last_baseline + SUBTITLE_GAP,
            site_title: card.site_title.clone(),
            site_host: card.site_host.clone(),
        };
        render_template(&template)
    }
}

impl OgRenderer for SvgOgRenderer {
    fn render_png(&self, card: &OgCard) -> Result<Vec<u8>, InfraError> {
        let svg = self.svg(card)?;
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|err| InfraError::raster(format!("invalid card svg: {err}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(card.width, card.height)
            .ok_or_else(|| InfraError::raster("card dimensions must be non-zero"))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|err| InfraError::raster(format!("png encoding failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::og::{OG_HEIGHT, OG_WIDTH};

    fn card() -> OgCard {
        OgCard {
            title_lines: vec!["Fearless".to_string(), "concurrency".to_string()],
            subtitle: "Threads without tears".to_string(),
            label: "Blog".to_string(),
            site_title: "Ink Notes".to_string(),
            site_host: "ink.example.com".to_string(),
            width: OG_WIDTH,
            height: OG_HEIGHT,
        }
    }

    #[test]
    fn svg_places_lines_on_increasing_baselines() {
        let renderer = SvgOgRenderer::new("sans-serif");
        let svg = renderer.svg(&card()).expect("svg");
        assert!(svg.contains("y=\"260\""));
        assert!(svg.contains("y=\"336\""));
        assert!(svg.contains("y=\"406\""));
    }

    #[test]
    fn png_has_card_dimensions() {
        let renderer = SvgOgRenderer::new("sans-serif");
        let png = renderer.render_png(&card()).expect("png");
        let size = imagesize::blob_size(&png).expect("size");
        assert_eq!(size.width, OG_WIDTH as usize);
        assert_eq!(size.height, OG_HEIGHT as usize);
    }
}
