use std::{process, sync::Arc};

use inkpress::{
    application::{
        chrome::{ChromeService, SiteIdentity},
        content::{ContentLoader, LoadedContent},
        error::AppError,
        notify::{NotifyService, UrlSelection, select_urls},
        og::{OgGenerator, OgReport, all_descriptors},
        render::render_service,
        repos::{StatsStore, UrlNotifier},
        search::{build_search_data, search},
        site::SiteBuilder,
        stats::StatsService,
    },
    config,
    domain::types::{ContentKind, StatCounter},
    infra::{
        assets::asset_version,
        error::InfraError,
        fs::FsContentSource,
        google::GoogleIndexingNotifier,
        http::{self, ServerState},
        indexnow::IndexNowNotifier,
        output::OutputDir,
        raster::SvgOgRenderer,
        supabase::SupabaseStatsStore,
        telemetry,
    },
};
use time::OffsetDateTime;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Build(config::BuildArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Build(args) => run_build(settings, args).await,
        config::Command::Og(args) => run_og(settings, args).await,
        config::Command::SearchIndex => run_search_index(settings).await,
        config::Command::Search(args) => run_search(settings, args).await,
        config::Command::Notify(args) => run_notify(settings, args).await,
        config::Command::Stats(args) => run_stats(settings, args).await,
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check => run_check(settings).await,
    }
}

async fn load_content(settings: &config::Settings) -> Result<LoadedContent, AppError> {
    let source = FsContentSource::open(&settings.paths.content_dir)?;
    let loader = ContentLoader::new(
        Arc::new(source),
        render_service(),
        settings.site.author.clone(),
    );
    loader.load().await
}

async fn site_builder(settings: &config::Settings) -> Result<SiteBuilder, AppError> {
    let identity = SiteIdentity::from(&settings.site);
    let chrome = ChromeService::new(
        identity,
        asset_version(),
        OffsetDateTime::now_utc().year(),
    );
    let output = OutputDir::prepare(&settings.paths.output_dir).await?;
    Ok(SiteBuilder::new(
        chrome,
        output,
        settings.site.syntax_theme.clone(),
        settings.indexing.indexnow_key.clone(),
        settings.search.max_results.get(),
    ))
}

async fn run_build(settings: config::Settings, args: config::BuildArgs) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    let builder = site_builder(&settings).await?;
    let report = builder.build(&loaded.index).await?;

    info!(
        target = "inkpress::build",
        pages = report.pages,
        failed_pages = report.failed_pages.len(),
        skipped_files = loaded.issues.len(),
        output = %builder.output().root().display(),
        "build finished"
    );

    if args.skip_og || !settings.og.enabled {
        info!(target = "inkpress::build", "skipping Open Graph images");
        return Ok(());
    }
    generate_og(&settings, &loaded, args.og.only_missing).await?;
    Ok(())
}

async fn run_og(settings: config::Settings, args: config::OgArgs) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    OutputDir::prepare(&settings.paths.output_dir).await?;
    generate_og(&settings, &loaded, args.only_missing).await?;
    Ok(())
}

async fn generate_og(
    settings: &config::Settings,
    loaded: &LoadedContent,
    only_missing: bool,
) -> Result<OgReport, AppError> {
    let identity = SiteIdentity::from(&settings.site);
    let renderer = Arc::new(SvgOgRenderer::new(settings.og.font_family.clone()));
    let generator = OgGenerator::new(
        renderer,
        identity.clone(),
        settings.paths.output_dir.clone(),
        settings.og.concurrency.get(),
    );
    let report = generator
        .generate(all_descriptors(&loaded.index, &identity), only_missing)
        .await?;

    info!(
        target = "inkpress::og",
        written = report.written,
        skipped = report.skipped,
        failed = report.failed.len(),
        "Open Graph images generated"
    );
    Ok(report)
}

async fn run_search_index(settings: config::Settings) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    let builder = site_builder(&settings).await?;
    let documents = builder.write_search_data(&loaded.index).await?;
    info!(target = "inkpress::search", documents, "search index written");
    Ok(())
}

async fn run_search(settings: config::Settings, args: config::SearchArgs) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    let data = build_search_data(&loaded.index);
    let max_results = settings.search.max_results.get();
    let limit = args.limit.unwrap_or(max_results).clamp(1, max_results);
    let results = search(&data, &args.query.join(" "), limit);

    if args.json {
        let encoded = serde_json::to_string_pretty(&results)
            .map_err(|err| AppError::unexpected(format!("failed to encode results: {err}")))?;
        println!("{encoded}");
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
    }
    for result in &results {
        println!(
            "{:>7.2}  {:<15}  {}  {}",
            result.score,
            result.document.kind.as_str(),
            result.document.title,
            result.document.url
        );
    }
    Ok(())
}

async fn run_notify(settings: config::Settings, args: config::NotifyArgs) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    let identity = SiteIdentity::from(&settings.site);

    let selection = if !args.urls.is_empty() {
        UrlSelection::Explicit(args.urls.clone())
    } else if args.all {
        UrlSelection::All
    } else {
        UrlSelection::Recent {
            days: args.recent.unwrap_or(settings.indexing.recent_days),
        }
    };
    let today = OffsetDateTime::now_utc().date();
    let urls = select_urls(&loaded.index, &identity, &selection, today)?;

    let notifiers = build_notifiers(&settings, &identity, &args)?;
    if notifiers.is_empty() && !args.dry_run {
        return Err(AppError::unavailable(
            "no search-engine notifier is configured; set indexing.google_credentials or indexing.indexnow_key",
        ));
    }

    let service = NotifyService::new(notifiers);
    info!(
        target = "inkpress::notify",
        urls = urls.len(),
        notifiers = ?service.notifier_names(),
        dry_run = args.dry_run,
        "submitting urls"
    );
    let report = service.run(urls, args.dry_run).await;

    info!(
        target = "inkpress::notify",
        urls = report.urls.len(),
        submitted = report.submitted(),
        failed = report.failed(),
        dry_run = report.dry_run,
        "notification finished"
    );
    if report.nothing_submitted() {
        return Err(AppError::unexpected(format!(
            "none of {} url(s) could be submitted",
            report.urls.len()
        )));
    }
    Ok(())
}

fn build_notifiers(
    settings: &config::Settings,
    identity: &SiteIdentity,
    args: &config::NotifyArgs,
) -> Result<Vec<Arc<dyn UrlNotifier>>, AppError> {
    let indexing = &settings.indexing;
    let mut notifiers: Vec<Arc<dyn UrlNotifier>> = Vec::new();

    if !args.skip_google
        && let Some(path) = indexing.google_credentials.as_deref()
    {
        let key = GoogleIndexingNotifier::load_key(path)?;
        notifiers.push(Arc::new(GoogleIndexingNotifier::new(
            key,
            indexing.google_endpoint.clone(),
            indexing.timeout,
        )?));
    }

    if !args.skip_indexnow
        && let Some(key) = indexing.indexnow_key.as_deref()
    {
        notifiers.push(Arc::new(IndexNowNotifier::new(
            identity,
            key,
            indexing.indexnow_endpoint.clone(),
            indexing.timeout,
        )?));
    }

    Ok(notifiers)
}

fn stats_service(settings: &config::Settings) -> Result<StatsService, AppError> {
    let service = match SupabaseStatsStore::from_settings(&settings.stats)? {
        Some(store) => StatsService::new(Arc::new(store) as Arc<dyn StatsStore>),
        None => StatsService::disabled(),
    };
    Ok(service)
}

async fn run_stats(settings: config::Settings, args: config::StatsArgs) -> Result<(), AppError> {
    let service = stats_service(&settings)?;
    if !service.is_enabled() {
        return Err(AppError::unavailable(
            "stats are not configured; set stats.supabase_url and stats.api_key",
        ));
    }

    match args.command {
        config::StatsCommand::Show { kind, slug } => {
            let kind: ContentKind = kind.parse()?;
            print_json(&service.get(kind, &slug).await?)
        }
        config::StatsCommand::Bump {
            kind,
            slug,
            counter,
        } => {
            let kind: ContentKind = kind.parse()?;
            let counter: StatCounter = counter.parse()?;
            print_json(&service.increment(kind, &slug, counter).await?)
        }
        config::StatsCommand::Top {
            kind,
            counter,
            limit,
        } => {
            let kind: ContentKind = kind.parse()?;
            let counter: StatCounter = counter.parse()?;
            print_json(&service.top(kind, counter, limit).await?)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let encoded = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{encoded}");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let output_dir = settings.paths.output_dir.clone();
    if !output_dir.join("index.html").is_file() {
        warn!(
            target = "inkpress::serve",
            output = %output_dir.display(),
            "output directory has no index.html; run `inkpress build` first"
        );
    }

    let stats = stats_service(&settings)?;
    let state = ServerState {
        output_dir: Arc::new(output_dir),
        stats: Arc::new(stats),
        max_results: settings.search.max_results.get(),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "inkpress::serve", addr = %settings.server.addr, "preview server listening");

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => return server_result(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }

    info!(target = "inkpress::serve", "shutting down");
    shutdown.notify_one();
    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "inkpress::serve",
                "graceful shutdown timed out; dropping open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let loaded = load_content(&settings).await?;
    if loaded.issues.is_empty() {
        info!(target = "inkpress::check", "all content files are valid");
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "{} content file(s) failed validation",
            loaded.issues.len()
        )))
    }
}
