//! # geocdn
//!
//! Export de points géographiques en GeoJSON et maintenance du catalogue
//! d'un CDN statique de données de barrières fluviales.
//!
//! ## Features
//!
//! - Inférence des colonnes latitude/longitude/id par nom (heuristique)
//! - Normalisation des valeurs tabulaires en scalaires JSON-compatibles
//! - Construction de Feature/FeatureCollection (géométrie `Point` uniquement)
//! - Écriture double format: `.geojson` (lisible) + `.geojson.gz` (gzip)
//! - Catalogue JSON des fichiers publiés, par catégorie
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geocdn::{columns, feature, writer};
//!
//! let names = vec!["id".to_string(), "lat".to_string(), "lon".to_string()];
//! let geo = columns::infer("barriers", &names).expect("table éligible");
//!
//! let (collection, skipped) = feature::build_collection(&geo, &rows);
//! if !collection.features.is_empty() {
//!     writer::write_dual(&collection, Path::new("data/barriers"))?;
//! }
//! ```

pub mod catalog;
pub mod columns;
pub mod error;
pub mod extract;
pub mod feature;
pub mod value;
pub mod writer;

pub use catalog::{Catalog, Category};
pub use columns::GeoColumns;
pub use error::CdnError;
pub use extract::{ExtractedPoint, Row, SkipReason};
pub use feature::SkipStats;
pub use value::Value;
