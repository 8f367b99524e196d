//! Définition et implémentation des commandes CLI
//!
//! - `export`: PostgreSQL → GeoJSON (+gzip), table par table
//! - `add`: ingestion d'un fichier GeoJSON existant dans le CDN
//! - `compress`: compression gzip d'un fichier ou d'un répertoire
//! - `init`: création de la structure du CDN et du catalogue
//! - `generate`: fichiers d'exemple à points aléatoires

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeomValue};
use rand::Rng;
use tracing::{info, warn};

use geocdn::{writer, Catalog, Category, CdnError};

use crate::db::DatabaseConfig;
use crate::export;

#[derive(Subcommand)]
pub enum Commands {
    /// Export every eligible table of a PostgreSQL database to GeoJSON
    Export {
        /// Output directory for GeoJSON files
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Source schema to scan for tables
        #[arg(long, default_value = "public")]
        schema: String,

        /// PostgreSQL host (défaut : env PGHOST / localhost)
        #[arg(long)]
        host: Option<String>,

        /// PostgreSQL database name (défaut : env PGDATABASE / barriers)
        #[arg(long)]
        database: Option<String>,

        /// PostgreSQL user (défaut : env PGUSER / postgres)
        #[arg(long)]
        user: Option<String>,

        /// PostgreSQL password (défaut : env PGPASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// PostgreSQL port (défaut : env PGPORT / 5432)
        #[arg(long)]
        port: Option<u16>,

        /// SSL mode: disable, prefer, require (défaut : env PGSSLMODE / disable)
        #[arg(long)]
        ssl: Option<String>,
    },

    /// Add a GeoJSON file to the CDN and register it in the catalog
    Add {
        /// Path to the source GeoJSON file
        source: PathBuf,

        /// Category of the file (types, countries, regions)
        #[arg(short, long)]
        category: String,

        /// Name to give the file, without extension
        #[arg(short, long)]
        name: String,

        /// Root directory of the CDN
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Compress GeoJSON files to gzip
    Compress {
        /// Path to a single GeoJSON file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Directory to scan recursively (défaut: data)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Delete original files after compression
        #[arg(short = 'x', long)]
        delete: bool,
    },

    /// Create the CDN directory structure and an empty catalog
    Init {
        /// Root directory of the CDN
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Generate sample GeoJSON files with random points
    Generate {
        /// Root directory of the CDN
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Exécute la commande demandée
pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Export {
            output,
            schema,
            host,
            database,
            user,
            password,
            port,
            ssl,
        } => {
            let mut config = DatabaseConfig::from_env();
            apply_database_overrides(&mut config, host, database, user, password, port, ssl);
            cmd_export(&config, &schema, &output).await
        }
        Commands::Add {
            source,
            category,
            name,
            root,
        } => cmd_add(&source, &category, &name, &root),
        Commands::Compress {
            file,
            directory,
            delete,
        } => cmd_compress(file.as_deref(), directory.as_deref(), delete),
        Commands::Init { root } => cmd_init(&root),
        Commands::Generate { root } => cmd_generate(&root),
    }
}

fn apply_database_overrides(
    config: &mut DatabaseConfig,
    host: Option<String>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    port: Option<u16>,
    ssl: Option<String>,
) {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(database) = database {
        config.dbname = database;
    }
    if let Some(user) = user {
        config.user = user;
    }
    if let Some(password) = password {
        config.password = Some(password);
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(ssl) = ssl {
        if let Ok(mode) = ssl.parse() {
            config.ssl_mode = mode;
        }
    }
}

/// Exécute la commande export
pub async fn cmd_export(config: &DatabaseConfig, schema: &str, output: &Path) -> Result<()> {
    info!(schema = schema, output = %output.display(), "Starting export");

    println!("=== Export {} ===", schema);
    println!("Output: {}", output.display());

    let report = export::run_export(config, schema, output).await?;
    report.display();

    Ok(())
}

/// Ajoute un fichier GeoJSON au CDN et l'enregistre dans le catalogue
pub fn cmd_add(source: &Path, category: &str, name: &str, root: &Path) -> Result<()> {
    let category = category.parse::<Category>()?;

    if !source.is_file() {
        return Err(CdnError::SourceNotFound(source.to_path_buf()).into());
    }

    let dest_dir = root.join("data").join(category.as_str());
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("Failed to create {}", dest_dir.display()))?;

    let filename = format!("{}.geojson", name.to_lowercase());
    let dest = dest_dir.join(&filename);
    fs::copy(source, &dest)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;
    println!("File copied: {}", dest.display());

    // Le chemin enregistré est toujours relatif à la racine du CDN, avec
    // des séparateurs Unix (c'est une URL une fois publié)
    let storage_path = format!("data/{}/{}", category.as_str(), filename);
    let catalog_path = root.join("metadata").join("catalog.json");
    let mut catalog = Catalog::load(&catalog_path)?;
    catalog.register(&storage_path);
    catalog.save(&catalog_path)?;
    println!("Catalog updated with {}", storage_path);

    println!("File added: {}", dest.display());
    Ok(())
}

/// Compresse un fichier unique ou tous les fichiers d'un répertoire
pub fn cmd_compress(file: Option<&Path>, directory: Option<&Path>, delete: bool) -> Result<()> {
    if let Some(file) = file {
        let report = writer::compress_file(file, delete)?;
        print_compression_report(&report, delete);
        return Ok(());
    }

    let directory = directory.unwrap_or_else(|| Path::new("data"));
    let files = writer::collect_geojson_files(directory)?;
    println!("Found {} GeoJSON files to compress", files.len());

    let mut compressed = 0usize;
    for path in &files {
        match writer::compress_file(path, delete) {
            Ok(report) => {
                print_compression_report(&report, delete);
                compressed += 1;
            }
            Err(e) => {
                warn!("Failed to compress {}: {}", path.display(), e);
            }
        }
    }

    println!("Compression done. {} files compressed.", compressed);
    Ok(())
}

fn print_compression_report(report: &geocdn::writer::CompressionReport, deleted: bool) {
    println!("Compressed: {}", report.output.display());
    println!("  Original size: {:.1} KB", report.original_size as f64 / 1024.0);
    println!(
        "  Compressed size: {:.1} KB",
        report.compressed_size as f64 / 1024.0
    );
    println!("  Reduction: {:.1}%", report.reduction_pct());
    if deleted {
        println!("Original file removed: {}", report.source.display());
    }
}

/// Crée la structure de répertoires du CDN et un catalogue vide
pub fn cmd_init(root: &Path) -> Result<()> {
    for category in Category::ALL {
        let dir = root.join("data").join(category.as_str());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        println!("Directory created: {}", dir.display());
    }

    let metadata = root.join("metadata");
    fs::create_dir_all(&metadata)?;
    println!("Directory created: {}", metadata.display());

    let catalog_path = metadata.join("catalog.json");
    Catalog::bootstrap().save(&catalog_path)?;
    println!("Catalog created: {}", catalog_path.display());

    fs::write(root.join("README.md"), CDN_README)?;

    println!("CDN structure created");
    Ok(())
}

/// Régions d'exemple: (nom, bbox (min_lon, min_lat, max_lon, max_lat), nombre)
const SAMPLE_COUNTRIES: &[(&str, (f64, f64, f64, f64), usize)] = &[
    ("france", (-5.0, 42.0, 8.0, 51.0), 200),
    ("spain", (-9.0, 36.0, 3.0, 44.0), 200),
    ("germany", (5.0, 47.0, 15.0, 55.0), 200),
];

const SAMPLE_TYPES: &[&str] = &["dam", "weir", "sluice", "lock"];

const SAMPLE_REGIONS: &[(&str, (f64, f64, f64, f64), usize)] = &[
    ("europe", (-10.0, 35.0, 30.0, 70.0), 300),
    ("mediterranean", (-5.0, 30.0, 40.0, 45.0), 300),
];

/// Bbox Europe par défaut
const DEFAULT_BBOX: (f64, f64, f64, f64) = (-10.0, 35.0, 30.0, 70.0);

/// Génère des fichiers GeoJSON d'exemple et les enregistre au catalogue
pub fn cmd_generate(root: &Path) -> Result<()> {
    let catalog_path = root.join("metadata").join("catalog.json");
    let mut catalog = Catalog::load(&catalog_path)?;

    for (country, bbox, count) in SAMPLE_COUNTRIES {
        write_sample_file(root, &mut catalog, Category::Countries, country, *bbox, *count)?;
    }
    for barrier_type in SAMPLE_TYPES {
        write_sample_file(root, &mut catalog, Category::Types, barrier_type, DEFAULT_BBOX, 150)?;
    }
    for (region, bbox, count) in SAMPLE_REGIONS {
        write_sample_file(root, &mut catalog, Category::Regions, region, *bbox, *count)?;
    }

    catalog.save(&catalog_path)?;
    println!("Sample file generation done");
    Ok(())
}

fn write_sample_file(
    root: &Path,
    catalog: &mut Catalog,
    category: Category,
    name: &str,
    bbox: (f64, f64, f64, f64),
    count: usize,
) -> Result<()> {
    let collection = random_collection(count, bbox);

    let filename = format!("{}.geojson", name);
    let dir = root.join("data").join(category.as_str());
    fs::create_dir_all(&dir)?;
    let path = dir.join(&filename);
    fs::write(&path, serde_json::to_string(&collection)?)?;
    println!("Sample file created: {} ({} features)", path.display(), count);

    catalog.register(&format!("data/{}/{}", category.as_str(), filename));
    Ok(())
}

/// FeatureCollection de points aléatoires dans une bbox
fn random_collection(count: usize, bbox: (f64, f64, f64, f64)) -> FeatureCollection {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let mut rng = rand::thread_rng();

    let features = (0..count)
        .map(|i| {
            let lon = rng.gen_range(min_lon..max_lon);
            let lat = rng.gen_range(min_lat..max_lat);

            let mut properties = geojson::JsonObject::new();
            properties.insert("id".to_string(), serde_json::json!(format!("test-{}", i)));
            properties.insert(
                "name".to_string(),
                serde_json::json!(format!("Test Point {}", i)),
            );
            properties.insert(
                "value".to_string(),
                serde_json::json!(rng.gen_range(1..=100)),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeomValue::Point(vec![lon, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

const CDN_README: &str = r#"# Barriers Data CDN

A Content Delivery Network for river barrier data in GeoJSON format.

## Structure

- `data/` - Contains all GeoJSON files
  - `types/` - Barriers organized by type
  - `countries/` - Barriers organized by country
  - `regions/` - Barriers organized by geographical region
- `metadata/` - Contains information about available data

## Usage

To use this CDN in your web application:

```javascript
// Example: Load data for a specific country
async function loadCountryData(countryCode) {
  const response = await fetch(`https://raw.githubusercontent.com/Gilles-Segura/barrier-data-cdn/main/data/countries/${countryCode.toLowerCase()}.geojson`);
  return await response.json();
}
```

## Available Files

Check the `metadata/catalog.json` file for a complete list of available files.
"#;
