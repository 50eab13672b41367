use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::{info, LevelFilter};
use milestone_lib::cli::{self, Command};
use milestone_lib::client::GalleryClient;
use milestone_lib::config::{Config, FlatConfig};
use milestone_lib::probe::HttpProbe;
use milestone_lib::storage::FileDocumentStore;

#[derive(Parser, Debug)]
#[command(version, about = "Photo galleries and like counts for the event site")]
struct Cli {
    #[command(flatten)]
    config: FlatConfig,

    #[command(subcommand)]
    command: Command,
}

fn setup_logger(level: LevelFilter) -> anyhow::Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config: Config = cli.config.into();
    setup_logger(config.log_level)?;
    info!("{:?}", &config);

    let catalog = config.load_catalog()?;
    let probe = HttpProbe::new(config.probe.max_retries, config.probe.retry_backoff)?;
    let store = FileDocumentStore::open(&config.store.path).await?;
    let client = GalleryClient::new(probe, store, catalog, config.client_config());

    cli::run(&client, cli.command).await
}
