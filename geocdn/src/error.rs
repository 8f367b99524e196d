//! Types d'erreurs pour le crate geocdn

use std::path::PathBuf;
use thiserror::Error;

/// Erreurs pouvant survenir lors de l'export ou de la gestion du catalogue
#[derive(Debug, Error)]
pub enum CdnError {
    /// Erreur d'I/O lors de la lecture ou de l'écriture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document JSON invalide ou non sérialisable
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catégorie inconnue
    #[error("Invalid category: '{0}'. Use: types, countries, regions")]
    InvalidCategory(String),

    /// Fichier source manquant
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// Catalogue absent (structure non initialisée)
    #[error("Catalog not found: {0} (run `init` first)")]
    CatalogNotFound(PathBuf),

    /// Le fichier est déjà compressé, on ne double pas le suffixe
    #[error("File is already gzip-compressed: {0}")]
    AlreadyCompressed(PathBuf),
}
