//! Connexion PostgreSQL, découverte des tables et lecture des lignes
//!
//! Le cœur de l'export ne connaît que des noms de colonnes et des valeurs
//! normalisées: ce module est la seule frontière avec le moteur SQL.
//! Chaque colonne est castée en texte côté SQL, puis convertie en
//! [`geocdn::Value`] d'après son type déclaré dans `information_schema`.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime, Timeouts};
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;

use geocdn::{GeoColumns, Row, Value};

/// Mode SSL pour la connexion PostgreSQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    /// Pas de SSL (défaut)
    #[default]
    Disable,
    /// SSL préféré mais non requis
    Prefer,
    /// SSL requis
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "off" | "false" | "no" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "on" | "true" | "yes" => Ok(SslMode::Require),
            _ => Err(format!(
                "Invalid SSL mode: {}. Use: disable, prefer, require",
                s
            )),
        }
    }
}

/// Configuration de la base de données
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
    pub pool_size: usize,
    pub ssl_mode: SslMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            dbname: "barriers".into(),
            user: "postgres".into(),
            password: None,
            pool_size: 4,
            ssl_mode: SslMode::Disable,
        }
    }
}

impl DatabaseConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PGHOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("PGPORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PGDATABASE").unwrap_or_else(|_| "barriers".into()),
            user: std::env::var("PGUSER").unwrap_or_else(|_| "postgres".into()),
            password: std::env::var("PGPASSWORD").ok(),
            pool_size: std::env::var("POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            ssl_mode: std::env::var("PGSSLMODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

/// Crée la configuration TLS pour rustls
fn make_tls_connector() -> Result<MakeRustlsConnect> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(MakeRustlsConnect::new(config))
}

/// Crée un pool de connexions
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.dbname.clone());
    cfg.user = Some(config.user.clone());
    cfg.password = config.password.clone();

    cfg.pool = Some(PoolConfig {
        max_size: config.pool_size,
        timeouts: Timeouts {
            wait: Some(Duration::from_secs(30)),
            create: Some(Duration::from_secs(10)),
            recycle: Some(Duration::from_secs(30)),
        },
        ..Default::default()
    });

    match config.ssl_mode {
        SslMode::Disable => cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("Failed to create database pool"),
        SslMode::Prefer | SslMode::Require => {
            let tls = make_tls_connector()?;
            cfg.create_pool(Some(Runtime::Tokio1), tls)
                .context("Failed to create database pool with TLS")
        }
    }
}

/// Teste la connexion à la base
pub async fn test_connection(pool: &Pool) -> Result<()> {
    let client = pool
        .get()
        .await
        .context("Failed to get connection from pool")?;
    client
        .execute("SELECT 1", &[])
        .await
        .context("Connection test failed")?;
    Ok(())
}

/// Une colonne avec son type déclaré
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

impl Column {
    /// Types SQL convertis en nombre JSON; tout le reste est stringifié
    pub fn is_decimal(&self) -> bool {
        matches!(
            self.data_type.as_str(),
            "numeric" | "decimal" | "real" | "double precision"
        )
    }
}

/// Liste les tables de base d'un schéma
pub async fn list_tables(pool: &Pool, schema: &str) -> Result<Vec<String>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT table_name::text
             FROM information_schema.tables
             WHERE table_type = 'BASE TABLE' AND table_schema = $1
             ORDER BY table_name",
            &[&schema],
        )
        .await
        .context("Failed to list tables")?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Colonnes d'une table, dans l'ordre de déclaration
pub async fn table_columns(pool: &Pool, schema: &str, table: &str) -> Result<Vec<Column>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT column_name::text, data_type::text
             FROM information_schema.columns
             WHERE table_schema = $1 AND table_name = $2
             ORDER BY ordinal_position",
            &[&schema, &table],
        )
        .await
        .with_context(|| format!("Failed to read columns of {}", table))?;

    Ok(rows
        .iter()
        .map(|row| Column {
            name: row.get(0),
            data_type: row.get(1),
        })
        .collect())
}

/// Lit les lignes d'une table en valeurs normalisées
///
/// Les lignes dont la latitude ou la longitude est NULL sont filtrées côté
/// SQL; le contrôle de plage et de coercibilité reste dans l'extracteur.
pub async fn fetch_rows(
    pool: &Pool,
    schema: &str,
    table: &str,
    columns: &[Column],
    geo: &GeoColumns,
) -> Result<Vec<Row>> {
    let select = columns
        .iter()
        .map(|col| format!("{}::text", quote_ident(&col.name)))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "SELECT {} FROM {}.{} WHERE {} IS NOT NULL AND {} IS NOT NULL",
        select,
        quote_ident(schema),
        quote_ident(table),
        quote_ident(&geo.latitude),
        quote_ident(&geo.longitude),
    );

    let client = pool.get().await?;
    let rows = client
        .query(&sql, &[])
        .await
        .with_context(|| format!("Failed to fetch rows from {}", table))?;

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record: Row = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let raw: Option<String> = row.get(i);
            record.insert(column.name.clone(), normalize_cell(column, raw));
        }
        result.push(record);
    }

    Ok(result)
}

/// Convertit une cellule castée en texte vers une valeur normalisée
fn normalize_cell(column: &Column, raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(text) if column.is_decimal() => match text.trim().parse::<f64>() {
            Ok(n) => Value::Number(n),
            // NaN textuel ou format exotique: on garde le texte tel quel
            Err(_) => Value::Text(text),
        },
        Some(text) => Value::Text(text),
    }
}

/// Quote un identifiant SQL (les noms de tables/colonnes sont découverts,
/// jamais fournis par l'utilisateur)
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
