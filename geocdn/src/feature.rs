//! Construction des Feature et FeatureCollection GeoJSON

use geojson::{Feature, FeatureCollection, Geometry, Value as GeomValue};
use tracing::debug;

use crate::columns::GeoColumns;
use crate::extract::{extract_point, ExtractedPoint, Row, SkipReason};

/// Compteurs de lignes écartées, par raison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    pub missing_coordinate: usize,
    pub not_numeric: usize,
    pub out_of_range: usize,
}

impl SkipStats {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::MissingCoordinate(_) => self.missing_coordinate += 1,
            SkipReason::NotNumeric(_) => self.not_numeric += 1,
            SkipReason::OutOfRange { .. } => self.out_of_range += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_coordinate + self.not_numeric + self.out_of_range
    }
}

/// Emballe un point validé dans une Feature GeoJSON
///
/// La géométrie est toujours `Point [longitude, latitude]`, jamais l'inverse.
pub fn to_feature(point: ExtractedPoint) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeomValue::Point(vec![
            point.longitude,
            point.latitude,
        ]))),
        id: None,
        properties: Some(point.properties),
        foreign_members: None,
    }
}

/// Construit une FeatureCollection à partir des lignes d'une table
///
/// Les lignes invalides sont comptées et écartées silencieusement, dans
/// l'ordre d'origine des lignes pour celles qui restent.
pub fn build_collection(geo: &GeoColumns, rows: &[Row]) -> (FeatureCollection, SkipStats) {
    let mut features = Vec::with_capacity(rows.len());
    let mut skipped = SkipStats::default();

    for row in rows {
        match extract_point(row, geo) {
            Ok(point) => features.push(to_feature(point)),
            Err(reason) => {
                debug!("Row skipped: {}", reason);
                skipped.record(&reason);
            }
        }
    }

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    (collection, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn geo() -> GeoColumns {
        GeoColumns {
            latitude: "lat".to_string(),
            longitude: "lon".to_string(),
            id: "id".to_string(),
        }
    }

    fn row(lat: Value, lon: Value) -> Row {
        [("lat".to_string(), lat), ("lon".to_string(), lon)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_to_feature_coordinate_order() {
        let feature = to_feature(ExtractedPoint {
            longitude: 2.35,
            latitude: 48.85,
            properties: geojson::JsonObject::new(),
        });

        let geometry = feature.geometry.unwrap();
        match geometry.value {
            GeomValue::Point(coords) => assert_eq!(coords, vec![2.35, 48.85]),
            other => panic!("Expected Point, got {:?}", other),
        }
    }

    #[test]
    fn test_build_collection_filters_invalid_rows() {
        let rows = vec![
            row(Value::Number(48.85), Value::Number(2.35)),
            row(Value::Number(91.0), Value::Number(0.0)),
            row(Value::from("n/a"), Value::Number(0.0)),
            row(Value::Null, Value::Number(0.0)),
            row(Value::Number(-33.9), Value::Number(151.2)),
        ];

        let (collection, skipped) = build_collection(&geo(), &rows);
        assert_eq!(collection.features.len(), 2);
        assert_eq!(skipped.out_of_range, 1);
        assert_eq!(skipped.not_numeric, 1);
        assert_eq!(skipped.missing_coordinate, 1);
        assert_eq!(skipped.total(), 3);
    }

    #[test]
    fn test_build_collection_empty_when_all_invalid() {
        let rows = vec![row(Value::Number(91.0), Value::Number(0.0))];
        let (collection, skipped) = build_collection(&geo(), &rows);
        assert!(collection.features.is_empty());
        assert_eq!(skipped.total(), 1);
    }

    #[test]
    fn test_build_collection_preserves_row_order() {
        let rows = vec![
            row(Value::Number(1.0), Value::Number(10.0)),
            row(Value::Number(2.0), Value::Number(20.0)),
        ];
        let (collection, _) = build_collection(&geo(), &rows);

        let lats: Vec<f64> = collection
            .features
            .iter()
            .map(|f| match &f.geometry.as_ref().unwrap().value {
                GeomValue::Point(c) => c[1],
                _ => panic!("Expected Point"),
            })
            .collect();
        assert_eq!(lats, vec![1.0, 2.0]);
    }
}
