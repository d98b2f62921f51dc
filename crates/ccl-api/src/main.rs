use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccl_api::{build_router, AppState, CclService, ServerConfig};
use ccl_core::defaults::CCL_SUBDIR;
use ccl_merge::{HttpMatterSource, LetterTemplate, MergeEngine, StaffDirectory};
use ccl_store::{DocumentEmitter, FilesystemBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "ccl_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ccl_api=debug,ccl_merge=debug,ccl_store=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("ccl-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();
    config.validate()?;

    let staff = Arc::new(StaffDirectory::load(&config.staff_directory_path).await);
    info!(
        subsystem = "api",
        staff_count = staff.len(),
        path = %config.staff_directory_path.display(),
        "Staff directory loaded"
    );

    let template = match &config.template_path {
        Some(path) => {
            let template = LetterTemplate::from_file(path).await?;
            info!(path = %path.display(), "Using letter template override");
            template
        }
        None => LetterTemplate::builtin(),
    };

    let matters = HttpMatterSource::new(&config.matters_api_base, config.matters_timeout)?;
    info!(
        subsystem = "api",
        component = "matters_client",
        base_url = %config.matters_api_base,
        "Matters client configured"
    );

    let backend = FilesystemBackend::new(&config.public_dir);
    if let Err(e) = backend.validate(CCL_SUBDIR).await {
        warn!(
            path = %config.public_dir.display(),
            error = %e,
            "CCL directory is not writable, generation will fail until fixed"
        );
    }

    let engine = MergeEngine::new(Arc::new(matters), staff);
    let ccl = CclService::new(engine, template, DocumentEmitter::new(backend));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_router(AppState::new(ccl, config));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
