//! Inférence des colonnes géographiques par nom
//!
//! Heuristique de premier-match, insensible à la casse, contre des listes
//! d'alias fixes. L'ordre de déclaration des colonnes de la table tranche
//! les égalités, pas la spécificité de l'alias.

/// Alias reconnus pour la colonne latitude
pub const LATITUDE_ALIASES: &[&str] = &["latitude", "lat", "y"];

/// Alias reconnus pour la colonne longitude
pub const LONGITUDE_ALIASES: &[&str] = &["longitude", "long", "lon", "lng", "x"];

/// Colonnes géographiques identifiées pour une table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoColumns {
    /// Nom de la colonne latitude
    pub latitude: String,

    /// Nom de la colonne longitude
    pub longitude: String,

    /// Nom de la colonne identifiant (première colonne si aucun alias ne matche)
    pub id: String,
}

/// Identifie les colonnes latitude/longitude/id d'une table
///
/// Retourne `None` si la table n'a pas de couple latitude/longitude: ce
/// n'est pas une erreur, la table est simplement inéligible à l'export.
pub fn infer(table: &str, columns: &[String]) -> Option<GeoColumns> {
    let latitude = find_first(columns, LATITUDE_ALIASES)?;
    let longitude = find_first(columns, LONGITUDE_ALIASES)?;

    let table_id = format!("{}_id", table.to_lowercase());
    let id_aliases = ["id", table_id.as_str(), "object_id", "objectid"];
    let id = find_first(columns, &id_aliases)
        .or_else(|| columns.first().cloned())?;

    Some(GeoColumns {
        latitude,
        longitude,
        id,
    })
}

/// Première colonne (dans l'ordre de la table) dont le nom matche un alias
fn find_first(columns: &[String], aliases: &[&str]) -> Option<String> {
    columns
        .iter()
        .find(|col| {
            let lower = col.to_lowercase();
            aliases.iter().any(|alias| *alias == lower)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_standard_names() {
        let geo = infer("atlas", &cols(&["id", "latitude", "longitude", "name"])).unwrap();
        assert_eq!(geo.latitude, "latitude");
        assert_eq!(geo.longitude, "longitude");
        assert_eq!(geo.id, "id");
    }

    #[test]
    fn test_infer_case_insensitive() {
        let geo = infer("atlas", &cols(&["ObjectId", "LAT", "Lng"])).unwrap();
        assert_eq!(geo.latitude, "LAT");
        assert_eq!(geo.longitude, "Lng");
        assert_eq!(geo.id, "ObjectId");
    }

    #[test]
    fn test_infer_first_match_wins() {
        // "y" apparaît avant "lat": l'ordre de la table l'emporte
        let geo = infer("t", &cols(&["y", "lat", "x"])).unwrap();
        assert_eq!(geo.latitude, "y");
        assert_eq!(geo.longitude, "x");
    }

    #[test]
    fn test_infer_table_specific_id() {
        let geo = infer("barriers", &cols(&["barriers_id", "lat", "lon"])).unwrap();
        assert_eq!(geo.id, "barriers_id");
    }

    #[test]
    fn test_infer_id_fallback_first_column() {
        let geo = infer("atlas", &cols(&["code", "lat", "lon"])).unwrap();
        assert_eq!(geo.id, "code");
    }

    #[test]
    fn test_infer_missing_latitude() {
        assert!(infer("t", &cols(&["id", "lon", "name"])).is_none());
    }

    #[test]
    fn test_infer_missing_longitude() {
        assert!(infer("t", &cols(&["id", "lat", "name"])).is_none());
    }

    #[test]
    fn test_infer_empty_columns() {
        assert!(infer("t", &[]).is_none());
    }
}
