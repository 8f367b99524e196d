//! Point d'entrée CLI pour barrier-cdn

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use barrier_cdn::cli::{self, Commands};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Exporter les données de barrières vers un CDN GeoJSON statique
#[derive(Parser)]
#[command(name = "barrier-cdn")]
#[command(author, version)]
#[command(about = "Export river barrier data from PostgreSQL to a static GeoJSON CDN")]
#[command(
    long_about = "Outil d'export de points géographiques (barrières fluviales) depuis PostgreSQL vers des fichiers GeoJSON compressés, organisés par catégorie et décrits dans un catalogue JSON."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    // Les erreurs de premier niveau sont imprimées, pas de code de sortie
    // distinct: chaque invocation est un batch ponctuel relancé à la main
    if let Err(e) = cli::run(cli.command).await {
        eprintln!("Error: {:#}", e);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
