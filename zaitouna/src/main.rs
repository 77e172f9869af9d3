//! Zaitouna exhibition gallery.
//!
//! A line-oriented shell over the gallery engine, suitable for curating a
//! collection from a terminal or driving it from scripts:
//!
//! ```bash
//! cargo run -p zaitouna -- --data-dir ./gallery-data
//! cargo run -p zaitouna -- list
//! cargo run -p zaitouna -- create "Sidi Bouzid"
//! ```
//!
//! Introductions and reflections are written by Claude when
//! `ANTHROPIC_API_KEY` is set. Without it the gallery still runs, and those
//! requests fail quietly.

mod audio;
mod headless;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zaitouna_core::{
    ClaudeWriter, FileStore, Gallery, GalleryConfig, IntroGenerator, OfflineGenerator,
};

#[derive(Parser)]
#[command(name = "zaitouna")]
#[command(about = "Spatial exhibition gallery for olive oil narratives")]
#[command(version)]
struct Cli {
    /// Directory holding the stored collection (overrides ZAITOUNA_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Page URL share links are built from (overrides ZAITOUNA_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Claude model for generated text (overrides ZAITOUNA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Never call the API, even when a key is configured
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive shell (default)
    Shell,

    /// Print the stored exhibitions and exit
    List,

    /// Create an exhibition, generate its introduction, and exit
    Create {
        /// Village name
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zaitouna=info".parse()?)
                .add_directive("zaitouna_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);
    let generator = build_generator(&cli, &config);
    let kv = FileStore::new(&config.data_dir);

    tracing::info!(data_dir = %config.data_dir.display(), "opening gallery");
    let mut gallery = Gallery::open(config, kv, generator).await;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => headless::run_shell(&mut gallery).await?,
        Command::List => headless::print_exhibitions(&gallery),
        Command::Create { name } => match gallery.create_exhibition(&name).await? {
            Some(id) => {
                println!("[CREATED] {id}");
                gallery.run_pending_intros().await;
                if let Some(intro) = gallery.active().and_then(|ex| ex.intro.as_deref()) {
                    println!("{intro}");
                }
            }
            None => anyhow::bail!("exhibition name must not be blank"),
        },
    }

    Ok(())
}

fn build_config(cli: &Cli) -> GalleryConfig {
    let mut config = GalleryConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    config
}

fn build_generator(cli: &Cli, config: &GalleryConfig) -> Box<dyn IntroGenerator> {
    if cli.offline {
        tracing::info!("offline mode, generated text disabled");
        return Box::new(OfflineGenerator);
    }
    match ClaudeWriter::from_env() {
        Ok(writer) => Box::new(writer.with_config(config.writer_config())),
        Err(e) => {
            tracing::warn!(error = %e, "Claude unavailable, generated text disabled");
            Box::new(OfflineGenerator)
        }
    }
}
