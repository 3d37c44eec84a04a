use anyhow::{Context, Result};
use clap::Parser;
use morph_cloud::config::Config;
use morph_cloud::shapes::ShapeKind;

fn main() -> Result<()> {
    let cfg = Config::parse();
    if cfg.list_shapes {
        for kind in ShapeKind::all() {
            println!("{:<10} {}", kind.name(), kind.label());
        }
        return Ok(());
    }

    init_logging(&cfg)?;
    morph_cloud::app::run(cfg)
}

/// Logs go to `--log-file` only; stderr would tear the alternate screen.
fn init_logging(cfg: &Config) -> Result<()> {
    let Some(path) = cfg.log_file.as_deref() else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("morph-cloud {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
