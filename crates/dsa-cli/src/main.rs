//! CLI frontend for the DSA 4.1 character companion.

mod commands;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dsa",
    about = "DSA 4.1 character companion: characters, probes and snapshot sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Database file (default: $DSA_DATABASE_URL, else ./dsa.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the spell and recipe catalogs
    Init,

    /// Create a new character with the default locations
    Create {
        /// Character name
        name: String,
    },

    /// List all characters
    List,

    /// Show a character's values and inventory
    Show {
        /// Character name, GUID or GUID prefix
        character: String,
    },

    /// Export a character as a JSON snapshot
    Export {
        /// Character name, GUID or GUID prefix
        character: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON snapshot
    Import {
        /// Snapshot file
        file: PathBuf,

        /// Import into this character instead of matching by GUID
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Hand a location and everything in it to another character
    Transfer {
        /// Current owner
        from: String,

        /// Location name
        location: String,

        /// New owner
        to: String,
    },

    /// Let a character rest for one night
    Rest {
        /// Character name, GUID or GUID prefix
        character: String,

        /// Resting conditions, -6 to +2
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        modifier: i32,

        /// RNG seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Roll a three-attribute probe
    Probe {
        /// Skill or spell value
        #[arg(long, allow_hyphen_values = true)]
        skill: i32,

        /// Difficulty; negative values make the probe easier
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        difficulty: i32,

        /// The three attribute values, comma separated
        #[arg(long, value_delimiter = ',')]
        attributes: Vec<i32>,

        /// Use these three W20 results instead of rolling
        #[arg(long, value_delimiter = ',')]
        rolls: Option<Vec<u32>>,

        /// RNG seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,

        /// Report quality points as ZfP* (spell probe)
        #[arg(long)]
        spell: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Probe {
            skill,
            difficulty,
            attributes,
            rolls,
            seed,
            spell,
        } => commands::probe::run(skill, difficulty, &attributes, rolls.as_deref(), seed, spell),
        command => match Runtime::new() {
            Ok(rt) => rt.block_on(run_store_command(cli.db.as_deref(), command)),
            Err(e) => Err(format!("cannot start async runtime: {e}")),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run_store_command(db: Option<&Path>, command: Commands) -> Result<(), String> {
    let store = commands::open_store(db).await?;
    match command {
        Commands::Init => commands::init::run(&store).await,
        Commands::Create { name } => commands::create::run(&store, &name).await,
        Commands::List => commands::list::run(&store).await,
        Commands::Show { character } => commands::show::run(&store, &character).await,
        Commands::Export { character, output } => {
            commands::export::run(&store, &character, output.as_deref()).await
        }
        Commands::Import { file, target } => {
            commands::import::run(&store, &file, target.as_deref()).await
        }
        Commands::Transfer { from, location, to } => {
            commands::transfer::run(&store, &from, &location, &to).await
        }
        Commands::Rest {
            character,
            modifier,
            seed,
        } => commands::rest::run(&store, &character, modifier, seed).await,
        Commands::Probe { .. } => Ok(()),
    }
}
