//! Écriture double format: `.geojson` en clair + `.geojson.gz` compressé
//!
//! Les deux fichiers portent le même contenu logique. Le fichier en clair
//! est indenté pour rester lisible dans un navigateur de dépôt; le fichier
//! gzip est compact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use geojson::FeatureCollection;
use tracing::info;

use crate::error::CdnError;

/// Chemins produits par une écriture double format
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Fichier `.geojson` non compressé
    pub plain: PathBuf,

    /// Fichier `.geojson.gz`
    pub compressed: PathBuf,
}

/// Résultat de la compression d'un fichier existant
#[derive(Debug, Clone)]
pub struct CompressionReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl CompressionReport {
    /// Pourcentage de réduction de taille
    pub fn reduction_pct(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }
}

/// Écrit une FeatureCollection en `<base>.geojson` et `<base>.geojson.gz`
pub fn write_dual(collection: &FeatureCollection, base: &Path) -> Result<WriteOutcome, CdnError> {
    if let Some(parent) = base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let plain = path_with_suffix(base, ".geojson");
    let compressed = path_with_suffix(base, ".geojson.gz");

    let mut writer = BufWriter::new(File::create(&plain)?);
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.flush()?;

    let mut encoder = GzEncoder::new(
        BufWriter::new(File::create(&compressed)?),
        Compression::default(),
    );
    serde_json::to_writer(&mut encoder, collection)?;
    encoder.finish()?.flush()?;

    info!(
        plain = %plain.display(),
        compressed = %compressed.display(),
        features = collection.features.len(),
        "FeatureCollection written"
    );

    Ok(WriteOutcome { plain, compressed })
}

/// Compresse un fichier `.geojson` existant vers son jumeau `.geojson.gz`
///
/// Le contenu est re-sérialisé en JSON compact (le clair peut être indenté).
/// Un fichier déjà suffixé `.gz` est refusé pour ne pas doubler l'extension.
pub fn compress_file(path: &Path, delete_original: bool) -> Result<CompressionReport, CdnError> {
    if path.extension().map_or(false, |ext| ext == "gz") {
        return Err(CdnError::AlreadyCompressed(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CdnError::SourceNotFound(path.to_path_buf()));
    }

    let document: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;

    let output = path_with_suffix(path, ".gz");
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&output)?), Compression::default());
    serde_json::to_writer(&mut encoder, &document)?;
    encoder.finish()?.flush()?;

    let original_size = fs::metadata(path)?.len();
    let compressed_size = fs::metadata(&output)?.len();

    if delete_original {
        fs::remove_file(path)?;
        info!(path = %path.display(), "Original file removed");
    }

    Ok(CompressionReport {
        source: path.to_path_buf(),
        output,
        original_size,
        compressed_size,
    })
}

/// Collecte récursivement les fichiers `.geojson` d'un répertoire
///
/// Les fichiers `.geojson.gz` sont exclus: relancer une compression de
/// répertoire ne recompresse jamais un fichier déjà compressé.
pub fn collect_geojson_files(dir: &Path) -> Result<Vec<PathBuf>, CdnError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let entry_path = entry.path();

        if entry_path.is_dir() {
            files.extend(collect_geojson_files(&entry_path)?);
        } else if has_geojson_extension(&entry_path) {
            files.push(entry_path);
        }
    }

    files.sort();
    Ok(files)
}

fn has_geojson_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with(".geojson"))
}

/// Ajoute un suffixe au chemin sans passer par `set_extension`
/// (qui mangerait une partie d'un nom contenant des points)
fn path_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
