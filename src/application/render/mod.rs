//! Markdown rendering pipeline.
//!
//! The pipeline is pure: it accepts Markdown, produces deterministic HTML and
//! surfaces structured errors. Persisting the result is the caller's job.

mod service;
mod types;

pub use service::{ComrakRenderService, render_service, syntax_theme_css};
pub use types::{
    ContentMetrics, RenderError, RenderOutput, RenderRequest, RenderService, RenderTarget,
};
