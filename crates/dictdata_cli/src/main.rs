//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dictdata_core` linkage and storage bootstrap from a terminal.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `dictdata_cli [DB_PATH]`. Without a path an in-memory database is
//! used. Setting `DICTDATA_LOG_DIR` (absolute path) starts core file logging;
//! `DICTDATA_LOG_LEVEL` overrides the build-mode default level.

use dictdata_core::db::migrations::latest_version;
use dictdata_core::db::{open_db, open_db_in_memory};
use dictdata_core::{
    init_logging, DictDataFilter, DictDataService, LogLevel, SqliteDictDataRepository,
};
use std::error::Error;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "DICTDATA_LOG_DIR";
const LOG_LEVEL_ENV: &str = "DICTDATA_LOG_LEVEL";

fn main() -> ExitCode {
    let logging = log_settings(
        std::env::var(LOG_DIR_ENV).ok(),
        std::env::var(LOG_LEVEL_ENV).ok(),
    );
    match run(std::env::args().nth(1), logging) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dictdata_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves `(level, log_dir)`; `None` when no log directory is configured.
fn log_settings(log_dir: Option<String>, level: Option<String>) -> Option<(String, String)> {
    let log_dir = log_dir.filter(|dir| !dir.trim().is_empty())?;
    let level = level
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| LogLevel::default_for_build().as_str().to_string());
    Some((level, log_dir))
}

fn run(
    db_path: Option<String>,
    logging: Option<(String, String)>,
) -> Result<(), Box<dyn Error>> {
    if let Some((level, log_dir)) = logging.as_ref() {
        init_logging(level, log_dir)?;
        println!("dictdata_core logging level={level} log_dir={log_dir}");
    }

    println!("dictdata_core ping={}", dictdata_core::ping());
    println!("dictdata_core version={}", dictdata_core::core_version());

    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    println!("dictdata_core schema_version={}", latest_version());

    let service = DictDataService::new(SqliteDictDataRepository::try_new(&conn)?);
    let page = service.page(&DictDataFilter::default())?;
    println!(
        "dictdata_core entries total={} page_size={}",
        page.total, page.page_size
    );
    Ok(())
}
