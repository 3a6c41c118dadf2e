// ABOUTME: Shared logging setup for the workspace console
// ABOUTME: Two functions: init() for stderr, init_file() when stderr would clutter the prompt

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Directory name used under the user's config dir for log files.
pub const APP_DIR: &str = "workspace-console";

/// Logging to stderr. Default: WARN level (INFO with `debug`), RUST_LOG override.
///
/// stdout belongs to the console transcript, so nothing here writes there.
pub fn init(debug: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter(debug))
        .init();
}

/// File-based logging. Default: WARN level (INFO with `debug`), RUST_LOG override.
/// Logs to ~/.config/workspace-console/{app_name}.log
/// If setup fails, prints a warning to stderr and falls back to [`init`].
pub fn init_file(app_name: &str, debug: bool) {
    if let Err(e) = init_file_inner(app_name, debug) {
        eprintln!("Warning: failed to set up file logging: {e}");
        init(debug);
    }
}

fn init_file_inner(app_name: &str, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = dirs::config_dir().ok_or("could not determine config directory")?;
    let log_dir = config_dir.join(APP_DIR);
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(format!("{app_name}.log")))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter(debug))
        .with_ansi(false)
        .init();

    Ok(())
}

fn default_level(debug: bool) -> Level {
    if debug {
        Level::INFO
    } else {
        Level::WARN
    }
}

fn filter(debug: bool) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(default_level(debug).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_init() {
        let _ = super::init as fn(bool);
    }

    #[test]
    fn exports_init_file() {
        let _ = super::init_file as fn(&str, bool);
    }

    #[test]
    fn debug_raises_default_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::INFO);
    }
}
