/// Polyspin Terminal - Rotating Polyhedron
///
/// Controls:
///   - Space: Play/pause
///   - 1-6: 4, 6, 8, 10, 12 or 20 faces
///   - Mouse drag: Rotate by hand
///   - x/y/z (X/Y/Z): Decrease (increase) angular velocity
///   - -/+: Size
///   - r/g/b (R/G/B): Color channels
///   - c: Collapse/expand the control panel
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use polyspin_terminal::{Cli, TerminalApp};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli
        .resolve_config()
        .context("failed to load configuration")?;

    let mut app = TerminalApp::new(&config).context("failed to query terminal size")?;
    app.run()?;

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
