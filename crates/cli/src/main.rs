use anyhow::Context;
use clap::{Parser, Subcommand};

use folio_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "folio", about = "Folio catalog service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server and the scheduled import job.
    Serve,
    /// Print the resolved configuration and exit.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load folio settings")?;

    match cli.command {
        Command::Serve => {
            folio_telemetry::init(&settings.telemetry)?;
            folio_app::run(settings).await
        }
        Command::Config => {
            println!("environment: {:?}", settings.environment);
            println!(
                "server: {}:{} (timeout {}ms)",
                settings.server.host, settings.server.port, settings.server.request_timeout_ms
            );
            println!(
                "import: every {}s, feed size {}, top-n {}",
                settings.import.interval_secs,
                settings.import.feed_record_count,
                settings.import.top_n
            );
            Ok(())
        }
    }
}
