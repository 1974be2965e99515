use freqdrift::{
    config::{ensure_defaults, load},
    console::stdin_commands,
    counter::SerialTransport,
    run, Monitor,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    let path = std::env::var("CONFIG").unwrap_or_else(|_| "config/freqdrift.toml".into());
    let mut cfg = load(&path)?;
    ensure_defaults(&mut cfg);

    let transport = SerialTransport::open(&cfg.serial);
    let monitor = Monitor::from_config(&cfg, transport);
    let commands = stdin_commands()?;
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("ctrl-c handler unavailable: {err}");
            std::future::pending::<()>().await;
        }
    };

    let _released = run(monitor, commands, shutdown).await?;
    Ok(())
}
