use std::path::Path;

use tracing_core::{Level, LevelFilter, Metadata};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, Layer};

/// Set up logging to the console and, when `log_file` is given, to that file as well.
///
/// Records of the `log` macros are forwarded to the subscriber. Nothing happens if a global
/// subscriber is already configured. Otherwise a panic hook logging the panic is installed.
pub fn install_logger(log_file: Option<&Path>) {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::INFO)
        .with_filter(filter_fn(is_relevant));

    let file = log_file.and_then(|path| {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name()?;
        std::fs::create_dir_all(directory).ok()?;

        let writer = tracing_appender::rolling::never(directory, file_name);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::INFO)
                .with_filter(filter_fn(is_relevant)),
        )
    });

    if registry().with(console).with(file).try_init().is_ok() {
        update_panic_hook(log_file);
    }
}

fn is_relevant(metadata: &Metadata<'_>) -> bool {
    match metadata.module_path() {
        // The wgpu crate is logging too much, so we skip `info` level.
        Some(path) if path.starts_with("wgpu") => *metadata.level() < Level::INFO,
        _ => true,
    }
}

fn update_panic_hook(log_file: Option<&Path>) {
    let hook = std::panic::take_hook();
    let log_file = log_file.map(|path| path.display().to_string());

    std::panic::set_hook(Box::new(move |info| {
        log::error!("PANIC => {info}");
        if let Some(log_file) = &log_file {
            eprintln!(
                "=== PANIC ===\nA fatal error happened, you can check the logs here => \
                 '{log_file}'\n============="
            );
        }
        hook(info);
    }));
}
