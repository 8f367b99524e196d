//! Boucle d'export table par table avec rapport structuré
//!
//! Les tables sont traitées séquentiellement (batch ponctuel, un seul
//! écrivain). Un échec sur une table est enregistré et la boucle continue:
//! sémantique best-effort, pas de tout-ou-rien.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use deadpool_postgres::Pool;
use serde::Serialize;
use tracing::{info, warn};

use geocdn::{columns, feature, writer};

use crate::db::{self, DatabaseConfig};

/// Statut global de l'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportStatus {
    /// Export réussi sans erreur
    Success,
    /// Export réussi avec des tables en échec
    PartialSuccess,
    /// Aucune table exportée et au moins un échec
    Failed,
}

/// Statistiques d'une table exportée
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableStats {
    /// Nombre de features écrites
    pub features: usize,
    /// Nombre de lignes écartées (coordonnées invalides)
    pub rows_skipped: usize,
}

/// Erreur rencontrée sur une table
#[derive(Debug, Clone, Serialize)]
pub struct TableError {
    pub table: String,
    pub message: String,
}

/// Rapport complet d'un export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Durée de l'export
    pub duration_secs: f64,
    /// Statut global
    pub status: ExportStatus,

    /// Nombre de tables inspectées
    pub tables_processed: usize,
    /// Nombre de tables exportées
    pub tables_exported: usize,
    /// Tables inéligibles ou sans ligne valide
    pub tables_skipped: usize,
    /// Tables en échec
    pub tables_failed: usize,
    /// Total de features écrites
    pub features_written: usize,
    /// Total de lignes écartées
    pub rows_skipped: usize,

    /// Statistiques par table exportée
    pub by_table: HashMap<String, TableStats>,

    /// Liste des erreurs par table
    pub errors: Vec<TableError>,
}

impl Default for ExportReport {
    fn default() -> Self {
        Self {
            duration_secs: 0.0,
            status: ExportStatus::Success,
            tables_processed: 0,
            tables_exported: 0,
            tables_skipped: 0,
            tables_failed: 0,
            features_written: 0,
            rows_skipped: 0,
            by_table: HashMap::new(),
            errors: Vec::new(),
        }
    }
}

impl ExportReport {
    /// Enregistre une table exportée
    pub fn record_export(&mut self, table: &str, features: usize, rows_skipped: usize) {
        self.tables_processed += 1;
        self.tables_exported += 1;
        self.features_written += features;
        self.rows_skipped += rows_skipped;
        self.by_table.insert(
            table.to_string(),
            TableStats {
                features,
                rows_skipped,
            },
        );
    }

    /// Enregistre une table ignorée (inéligible ou vide)
    pub fn record_skip(&mut self) {
        self.tables_processed += 1;
        self.tables_skipped += 1;
    }

    /// Enregistre une table en échec
    pub fn record_failure(&mut self, table: &str, message: &str) {
        self.tables_processed += 1;
        self.tables_failed += 1;
        self.errors.push(TableError {
            table: table.to_string(),
            message: message.to_string(),
        });
    }

    /// Définit la durée de l'export
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.tables_failed == 0 {
            ExportStatus::Success
        } else if self.tables_exported > 0 {
            ExportStatus::PartialSuccess
        } else {
            ExportStatus::Failed
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("EXPORT REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!(
            "Tables: {} processed, {} exported, {} skipped, {} failed",
            self.tables_processed, self.tables_exported, self.tables_skipped, self.tables_failed
        );
        println!(
            "Features: {} written, {} rows skipped",
            self.features_written, self.rows_skipped
        );

        if !self.by_table.is_empty() {
            println!("\n--- BY TABLE ---");
            let mut tables: Vec<_> = self.by_table.iter().collect();
            tables.sort_by_key(|(name, _)| name.as_str());
            for (name, stats) in tables {
                println!(
                    "  {}: {} features, {} rows skipped",
                    name, stats.features, stats.rows_skipped
                );
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in &self.errors {
                println!("  [{}] {}", e.table, e.message);
            }
        }

        println!("\n{}", "=".repeat(60));
    }
}

/// Résultat du traitement d'une table
enum TableOutcome {
    Exported { features: usize, rows_skipped: usize },
    NoGeoColumns,
    NoValidRows,
}

/// Exporte toutes les tables éligibles d'un schéma vers `output`
pub async fn run_export(config: &DatabaseConfig, schema: &str, output: &Path) -> Result<ExportReport> {
    let pool = db::create_pool(config).await?;
    db::test_connection(&pool).await?;
    println!(
        "Connected to {}@{}:{}/{}",
        config.user, config.host, config.port, config.dbname
    );

    let tables = db::list_tables(&pool, schema).await?;
    println!("Tables found: {}", tables.len());

    std::fs::create_dir_all(output)?;

    let started = Instant::now();
    let mut report = ExportReport::default();

    for table in &tables {
        println!("Processing table: {}", table);

        match export_table(&pool, schema, table, output).await {
            Ok(TableOutcome::Exported {
                features,
                rows_skipped,
            }) => {
                println!(
                    "  Wrote {}.geojson and {}.geojson.gz ({} features)",
                    table, table, features
                );
                report.record_export(table, features, rows_skipped);
            }
            Ok(TableOutcome::NoGeoColumns) => {
                println!(
                    "  Table {} has no geographic columns. Skipped.",
                    table
                );
                report.record_skip();
            }
            Ok(TableOutcome::NoValidRows) => {
                println!("  No valid feature could be built for {}. Skipped.", table);
                report.record_skip();
            }
            Err(e) => {
                warn!("Failed to export table {}: {:#}", table, e);
                report.record_failure(table, &format!("{:#}", e));
            }
        }
    }

    report.set_duration(started.elapsed());
    report.finalize();

    info!(
        exported = report.tables_exported,
        skipped = report.tables_skipped,
        failed = report.tables_failed,
        features = report.features_written,
        "Export complete"
    );

    Ok(report)
}

/// Traite une seule table: inférence, lecture, conversion, écriture
async fn export_table(
    pool: &Pool,
    schema: &str,
    table: &str,
    output: &Path,
) -> Result<TableOutcome> {
    let table_columns = db::table_columns(pool, schema, table).await?;
    let names: Vec<String> = table_columns.iter().map(|c| c.name.clone()).collect();

    let Some(geo) = columns::infer(table, &names) else {
        return Ok(TableOutcome::NoGeoColumns);
    };

    let rows = db::fetch_rows(pool, schema, table, &table_columns, &geo).await?;
    if rows.is_empty() {
        return Ok(TableOutcome::NoValidRows);
    }

    let (collection, skipped) = feature::build_collection(&geo, &rows);
    if collection.features.is_empty() {
        return Ok(TableOutcome::NoValidRows);
    }

    writer::write_dual(&collection, &output.join(table))?;

    Ok(TableOutcome::Exported {
        features: collection.features.len(),
        rows_skipped: skipped.total(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_default_status() {
        let report = ExportReport::default();
        assert_eq!(report.status, ExportStatus::Success);
        assert_eq!(report.tables_processed, 0);
    }

    #[test]
    fn test_record_export() {
        let mut report = ExportReport::default();
        report.record_export("atlas", 120, 3);
        report.record_export("dams", 40, 0);

        assert_eq!(report.tables_processed, 2);
        assert_eq!(report.tables_exported, 2);
        assert_eq!(report.features_written, 160);
        assert_eq!(report.rows_skipped, 3);
        assert_eq!(report.by_table.get("atlas").unwrap().features, 120);
    }

    #[test]
    fn test_finalize_success() {
        let mut report = ExportReport::default();
        report.record_export("atlas", 10, 0);
        report.record_skip();
        report.finalize();
        assert_eq!(report.status, ExportStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = ExportReport::default();
        report.record_export("atlas", 10, 0);
        report.record_failure("broken", "permission denied");
        report.finalize();
        assert_eq!(report.status, ExportStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = ExportReport::default();
        report.record_failure("broken", "permission denied");
        report.finalize();
        assert_eq!(report.status, ExportStatus::Failed);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].table, "broken");
    }
}
