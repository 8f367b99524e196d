//! # barrier-cdn
//!
//! Export de données de barrières fluviales depuis PostgreSQL vers un CDN
//! statique de fichiers GeoJSON, avec maintenance du catalogue.
//!
//! ## Features
//!
//! - Découverte des tables éligibles via `information_schema`
//! - Export par table en `.geojson` + `.geojson.gz`
//! - Ingestion de fichiers existants dans l'arborescence du CDN
//! - Compression et catalogue idempotents
//!
//! ## Usage CLI
//!
//! ```bash
//! # Initialiser la structure du CDN
//! barrier-cdn init
//!
//! # Exporter toutes les tables éligibles de la base
//! barrier-cdn export --output ./data
//!
//! # Ajouter un fichier au CDN et au catalogue
//! barrier-cdn add ./atlas.geojson --category countries --name france
//!
//! # Compresser les fichiers GeoJSON d'un répertoire
//! barrier-cdn compress --directory ./data
//! ```

pub mod cli;
pub mod db;
pub mod export;

pub use db::DatabaseConfig;
pub use export::{ExportReport, ExportStatus};
