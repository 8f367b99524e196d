//! Tests d'intégration PostgreSQL
//!
//! Ces tests nécessitent une base PostgreSQL disponible.
//! Configuration via variables d'environnement:
//! - PGHOST, PGPORT, PGUSER, PGPASSWORD, PGDATABASE
//!
//! Exécution:
//! ```bash
//! # Avec PostgreSQL local
//! cargo test --test postgres_integration -- --ignored
//!
//! # Avec Docker
//! docker run -d --name postgres-test -e POSTGRES_PASSWORD=test -p 5432:5432 postgres
//! PGPASSWORD=test cargo test --test postgres_integration -- --ignored
//! ```

use anyhow::Result;
use deadpool_postgres::Pool;

use barrier_cdn::db::{self, DatabaseConfig};
use barrier_cdn::export;

const TEST_SCHEMA: &str = "barrier_cdn_test";

async fn create_test_pool() -> Result<Pool> {
    let config = DatabaseConfig::from_env();
    db::create_pool(&config).await
}

/// Prépare un schéma de test avec une table éligible et une inéligible
async fn setup_test_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;

    client
        .batch_execute(&format!(
            r#"
            DROP SCHEMA IF EXISTS {schema} CASCADE;
            CREATE SCHEMA {schema};

            CREATE TABLE {schema}.atlas (
                id INTEGER PRIMARY KEY,
                latitude NUMERIC(9, 6),
                longitude NUMERIC(9, 6),
                label TEXT,
                country TEXT
            );

            CREATE TABLE {schema}.lookup (
                code TEXT PRIMARY KEY,
                description TEXT
            );

            INSERT INTO {schema}.atlas VALUES
                (1, 48.8566, 2.3522, 'Dam', 'FR'),
                (2, 91.0, 0.0, 'OutOfRange', 'XX'),
                (3, NULL, 5.0, 'NullLat', 'FR'),
                (4, -33.9, 151.2, 'Weir', 'AU');
            "#,
            schema = TEST_SCHEMA
        ))
        .await?;

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_export_eligible_table() -> Result<()> {
    let pool = create_test_pool().await?;
    setup_test_schema(&pool).await?;

    let output = tempfile::tempdir()?;
    let config = DatabaseConfig::from_env();
    let report = export::run_export(&config, TEST_SCHEMA, output.path()).await?;

    // atlas exportée, lookup ignorée (pas de colonnes géographiques)
    assert_eq!(report.tables_exported, 1);
    assert_eq!(report.tables_skipped, 1);

    let stats = report.by_table.get("atlas").expect("atlas should be exported");
    // La ligne NULL est filtrée côté SQL, la ligne hors plage par l'extracteur
    assert_eq!(stats.features, 2);
    assert_eq!(stats.rows_skipped, 1);

    let plain = output.path().join("atlas.geojson");
    assert!(plain.is_file());
    assert!(output.path().join("atlas.geojson.gz").is_file());

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&plain)?)?;
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);

    // L'ordre des lignes sans ORDER BY n'est pas garanti: on cherche par id
    let paris = features
        .iter()
        .find(|f| f["properties"]["id"] == "1")
        .expect("feature with id 1");
    assert_eq!(
        paris["geometry"]["coordinates"],
        serde_json::json!([2.3522, 48.8566])
    );
    // Entier stringifié, colonnes lat/lon exclues des propriétés
    assert!(paris["properties"].get("latitude").is_none());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_list_tables_and_columns() -> Result<()> {
    let pool = create_test_pool().await?;
    setup_test_schema(&pool).await?;

    let tables = db::list_tables(&pool, TEST_SCHEMA).await?;
    assert_eq!(tables, vec!["atlas".to_string(), "lookup".to_string()]);

    let columns = db::table_columns(&pool, TEST_SCHEMA, "atlas").await?;
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "latitude", "longitude", "label", "country"]);
    assert!(columns[1].is_decimal());
    assert!(!columns[0].is_decimal());

    Ok(())
}
