use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "inkpress_content_loaded_total",
            Unit::Count,
            "Content files loaded successfully, labelled by kind."
        );
        describe_counter!(
            "inkpress_content_skipped_total",
            Unit::Count,
            "Content files skipped because they failed validation, labelled by kind."
        );
        describe_counter!(
            "inkpress_pages_written_total",
            Unit::Count,
            "HTML pages written by the site builder."
        );
        describe_counter!(
            "inkpress_pages_failed_total",
            Unit::Count,
            "HTML pages the site builder could not write."
        );
        describe_counter!(
            "inkpress_og_images_total",
            Unit::Count,
            "Open Graph images processed, labelled by outcome."
        );
        describe_histogram!(
            "inkpress_og_render_ms",
            Unit::Milliseconds,
            "Time spent rasterising one Open Graph image."
        );
        describe_histogram!(
            "inkpress_build_ms",
            Unit::Milliseconds,
            "Wall time of a full static build, excluding Open Graph images."
        );
        describe_counter!(
            "inkpress_notify_urls_total",
            Unit::Count,
            "URLs submitted to search engines, labelled by notifier and outcome."
        );
        describe_counter!(
            "inkpress_stats_requests_total",
            Unit::Count,
            "Stats service calls, labelled by operation."
        );
    });
}
