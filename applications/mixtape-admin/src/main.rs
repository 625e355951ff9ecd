/// Mixtape Admin - database operator tool
use clap::{Parser, Subcommand};
use mixtape_admin::{
    commands::{self, AppendTarget},
    config::AdminConfig,
};
use mixtape_storage::LocalStorageContext;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mixtape-admin")]
#[command(about = "Mixtape database administration", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./mixtape.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL, overriding the configuration
    #[arg(long, global = true, env = "MIXTAPE_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate {
        /// Stop at this version instead of the latest
        #[arg(long)]
        to: Option<i64>,
    },
    /// Revert migrations newer than a version (0 reverts everything)
    Revert {
        /// Version to go back to
        #[arg(long)]
        to: i64,
    },
    /// Show known migrations and whether they are applied
    Status,
    /// Print the live schema as JSON
    Schema,
    /// Append a track or a sub-playlist to the end of a playlist
    Append {
        /// Playlist UUID or short code
        playlist: String,

        /// Track UUID or short code
        #[arg(long, conflicts_with = "sub_playlist", required_unless_present = "sub_playlist")]
        track: Option<String>,

        /// Sub-playlist UUID or short code
        #[arg(long)]
        sub_playlist: Option<String>,
    },
    /// List the tracks a playlist plays, sub-playlists expanded
    Resolve {
        /// Playlist UUID or short code
        playlist: String,

        /// Print JSON instead of one line per track
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mixtape_admin=info,mixtape_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AdminConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.storage.database_url = url;
    }
    config.validate()?;

    let pool = mixtape_storage::create_pool(&config.storage).await?;

    match cli.command {
        Commands::Migrate { to } => {
            let steps = commands::migrate(&pool, to).await?;
            if steps.is_empty() {
                println!("Schema is up to date");
            }
            for step in steps {
                println!("{:?} {} {}", step.direction, step.version, step.name);
            }
        }
        Commands::Revert { to } => {
            for step in commands::revert(&pool, to).await? {
                println!("{:?} {} {}", step.direction, step.version, step.name);
            }
        }
        Commands::Status => {
            for migration in commands::status(&pool).await? {
                let applied = migration
                    .applied_at
                    .map_or_else(|| "pending".to_string(), |at| at.to_rfc3339());
                println!("{} {:<24} {}", migration.version, migration.name, applied);
            }
        }
        Commands::Schema => {
            let description = commands::describe(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Commands::Append {
            playlist,
            track,
            sub_playlist,
        } => {
            let storage =
                LocalStorageContext::new(pool).with_cycle_rejection(config.storage.reject_cycles);
            let target = match (track, sub_playlist) {
                (Some(track), _) => AppendTarget::Track(track),
                (None, Some(sub)) => AppendTarget::Playlist(sub),
                (None, None) => anyhow::bail!("either --track or --sub-playlist is required"),
            };
            let entry = commands::append(&storage, &playlist, target).await?;
            println!("{} at position {}", entry.id, entry.position);
        }
        Commands::Resolve { playlist, json } => {
            let storage = LocalStorageContext::new(pool);
            let resolved = commands::resolve(&storage, &playlist).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                println!("{} {}", resolved.playlist.code, resolved.playlist.title);
                for track in &resolved.tracks {
                    println!("  {} {}", track.code, track.title);
                }
            }
        }
    }

    Ok(())
}
