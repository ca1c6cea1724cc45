mod cli;
mod error;
mod logging;
mod render;
mod settings;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{debug, info};
use updinfo_backend::{Endpoint, StaticBuildIdentity, Transport};
use updinfo_core::{
    Collaborators, FetchError, FileTransport, HttpTransport, JsonDeserializer, UpdateInfo,
    UpdateInfoFetcher, VersionNumber, WrapCache,
};
use updinfo_platform::AppPaths;

use crate::cli::Args;
use crate::error::AppError;
use crate::render::Renderer;
use crate::settings::Settings;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            eprintln!("updinfo: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let paths =
        AppPaths::new().map_err(|error| AppError::operation_failed("Locate app directories", error))?;
    let mut settings = Settings::load(&paths);
    args.apply(&mut settings);
    logging::init_logging(&paths, settings.debug_logging, settings.max_log_size_bytes);
    debug!("Effective settings: {settings:?}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| AppError::operation_failed("Start async runtime", error))?;

    let endpoint = Endpoint::new(settings.endpoint.clone());
    let identity = StaticBuildIdentity::new(
        settings.channel.clone(),
        Some(
            settings
                .current_version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        ),
    );
    let fetcher = UpdateInfoFetcher::new(
        Collaborators {
            transport: transport_for(&endpoint, settings.http_timeout_secs)?,
            deserializer: Arc::new(JsonDeserializer),
            identity: Arc::new(identity),
        },
        endpoint,
        runtime.handle().clone(),
    );
    let info = fetcher.info();

    fetcher.start_fetch();
    let outcome = fetcher.wait_until_done(Duration::from_secs(settings.wait_timeout_secs));
    let endpoint = fetcher.endpoint().to_string();
    if outcome.is_none() {
        return Err(AppError::timeout(
            "Update info fetch",
            settings.wait_timeout_secs,
        ));
    }
    runtime.block_on(fetcher.shutdown());

    match info.fetch_error() {
        FetchError::None => {
            info!("Rendering update info from {endpoint}");
            render(&info, &settings, args)
        }
        error => Err(AppError::fetch_failed(endpoint, error)),
    }
}

fn transport_for(endpoint: &Endpoint, timeout_secs: u64) -> Result<Arc<dyn Transport>, AppError> {
    match endpoint.scheme() {
        Some("http" | "https") => {
            let transport = HttpTransport::new(Duration::from_secs(timeout_secs))
                .map_err(|error| AppError::operation_failed("Create HTTP client", error))?;
            Ok(Arc::new(transport))
        }
        _ => Ok(Arc::new(FileTransport)),
    }
}

fn render(info: &UpdateInfo, settings: &Settings, args: &Args) -> Result<(), AppError> {
    let wrap = WrapCache::new();
    let build_version = info
        .build_version()
        .and_then(|raw| raw.parse::<VersionNumber>().ok());
    let renderer = Renderer::new(&wrap, settings.wrap_width, info.build_channel())
        .with_build_version(build_version)
        .new_only(args.new_only);

    let mut stdout = std::io::stdout().lock();
    let written = if args.all {
        renderer.render_channels(&mut stdout, &info.channels())
    } else {
        let channel = info
            .active_channel()
            .ok_or_else(|| AppError::channel_not_published(info.build_channel()))?;
        renderer.render_channel(&mut stdout, &channel)
    };

    written
        .and_then(|()| stdout.flush())
        .map_err(|error| AppError::operation_failed("Write output", error))
}
