//! Extraction des coordonnées et des propriétés d'une ligne tabulaire
//!
//! Une ligne invalide n'est pas une erreur: elle produit un [`SkipReason`]
//! et la boucle d'export passe à la ligne suivante.

use std::collections::HashMap;
use std::fmt;

use geojson::JsonObject;

use crate::columns::GeoColumns;
use crate::value::Value;

/// Une ligne tabulaire: nom de colonne -> valeur normalisée
pub type Row = HashMap<String, Value>;

/// Raison pour laquelle une ligne est écartée de l'export
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Colonne de coordonnée absente ou NULL
    MissingCoordinate(String),

    /// Valeur de coordonnée non coercible en flottant
    NotNumeric(String),

    /// Coordonnée hors plage géographique valide
    OutOfRange { column: String, value: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCoordinate(col) => write!(f, "missing coordinate '{}'", col),
            SkipReason::NotNumeric(col) => write!(f, "non-numeric coordinate '{}'", col),
            SkipReason::OutOfRange { column, value } => {
                write!(f, "coordinate '{}' out of range: {}", column, value)
            }
        }
    }
}

/// Point validé avec ses propriétés normalisées
#[derive(Debug, Clone)]
pub struct ExtractedPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub properties: JsonObject,
}

/// Extrait un point géographique et ses propriétés d'une ligne
///
/// La latitude doit être dans [-90, 90] et la longitude dans [-180, 180].
/// Toutes les colonnes autres que latitude/longitude deviennent des
/// propriétés JSON.
pub fn extract_point(row: &Row, geo: &GeoColumns) -> Result<ExtractedPoint, SkipReason> {
    let latitude = coerce_coordinate(row, &geo.latitude)?;
    let longitude = coerce_coordinate(row, &geo.longitude)?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SkipReason::OutOfRange {
            column: geo.latitude.clone(),
            value: latitude,
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(SkipReason::OutOfRange {
            column: geo.longitude.clone(),
            value: longitude,
        });
    }

    let mut properties = JsonObject::new();
    for (column, value) in row {
        if column == &geo.latitude || column == &geo.longitude {
            continue;
        }
        properties.insert(column.clone(), value.to_json());
    }

    Ok(ExtractedPoint {
        longitude,
        latitude,
        properties,
    })
}

fn coerce_coordinate(row: &Row, column: &str) -> Result<f64, SkipReason> {
    let value = row
        .get(column)
        .ok_or_else(|| SkipReason::MissingCoordinate(column.to_string()))?;

    if value.is_null() {
        return Err(SkipReason::MissingCoordinate(column.to_string()));
    }

    value
        .as_f64()
        .ok_or_else(|| SkipReason::NotNumeric(column.to_string()))
}
