use chrono::Utc;
use env_logger::fmt::Formatter;
use log::{LevelFilter, Record};
use std::io::Write;

/// Initialise `env_logger` for the command-line tools.
///
/// `RUST_LOG` wins when set. Otherwise this crate logs at debug in debug
/// builds and info in release, and every other crate is silenced.
pub fn setup_logger(app_name: &str) {
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        let level = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        builder.filter(None, LevelFilter::Off);
        builder.filter(Some("segment_overlay"), level);
        builder.filter(Some(app_name), level);
    }

    builder.format(|buf: &mut Formatter, record: &Record| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");
        let module_info = match (record.module_path(), record.line()) {
            (Some(module), Some(line)) => format!("{module}:{line}"),
            (Some(module), None) => module.to_string(),
            _ => "unknown".to_string(),
        };
        writeln!(
            buf,
            "{} {:<5} {} {}",
            timestamp,
            record.level(),
            module_info,
            record.args()
        )
    });

    if builder.try_init().is_err() {
        eprintln!("Logger already initialised");
    }
}
