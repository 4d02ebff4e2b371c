//! tracing setup shared by the browser build and the native walkthrough binary.

use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Dependencies only speak up on warnings; per-step `trace!` output needs `RUST_LOG`.
const DEFAULT_FILTER: &str = "warn,walkthrough=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log file location from a `RUST_LOG_FILE`-style value. `off` or an empty
/// value disables the file layer.
pub fn log_file_from(value: Option<&str>) -> Option<std::path::PathBuf> {
    match value.map(str::trim) {
        None => Some(std::path::PathBuf::from("logs/walkthrough.log")),
        Some("") | Some("off") => None,
        Some(path) => Some(std::path::PathBuf::from(path)),
    }
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Browser console via tracing-wasm. A second handle on the same page
        /// finds the subscriber already set and leaves it alone.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());
            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init()
                .is_ok();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();

            if installed {
                tracing::info!(filter = DEFAULT_FILTER, "walkthrough logging ready");
            }
        }
    } else {
        use std::ffi::OsStr;
        use std::path::Path;

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// stderr plus an optional daily-rolling file (`RUST_LOG_FILE`).
        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact();

            let log_file = log_file_from(std::env::var("RUST_LOG_FILE").ok().as_deref());
            let file_layer = log_file.as_deref().map(|path| {
                let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
                let name = path.file_name().unwrap_or(OsStr::new("walkthrough.log"));
                let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
                let _ = FILE_GUARD.set(guard);
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact()
            });

            if tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_err()
            {
                return;
            }
            tracing::info!(file = ?log_file, "walkthrough logging ready");

            std::panic::set_hook(Box::new(|info| {
                let payload = info
                    .payload()
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic>");
                let location = info.location().map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
                let backtrace = std::backtrace::Backtrace::force_capture();
                tracing::error!(location = location.as_deref().unwrap_or("?"), "panic: {payload}\n{backtrace}");
            }));
        }
    }
}
