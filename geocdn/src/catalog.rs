//! Catalogue JSON des fichiers publiés sur le CDN
//!
//! Le catalogue est un document unique (`metadata/catalog.json`) rechargé
//! en entier au début de chaque opération, muté en mémoire puis réécrit de
//! façon atomique (fichier temporaire + rename). Précondition documentée:
//! au plus un processus écrivain à la fois, aucun verrouillage n'est fait.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CdnError;

/// Nom du catalogue publié
const CATALOG_NAME: &str = "Barrier Data CDN";

/// Description du catalogue publié
const CATALOG_DESCRIPTION: &str = "Content Delivery Network for river barrier data";

/// Catégorie de rangement d'un fichier de données
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Types,
    Countries,
    Regions,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Types, Category::Countries, Category::Regions];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Types => "types",
            Category::Countries => "countries",
            Category::Regions => "regions",
        }
    }

    /// Description statique de la catégorie dans le catalogue
    pub fn description(&self) -> &'static str {
        match self {
            Category::Types => "Barrier data organized by type",
            Category::Countries => "Barrier data organized by country",
            Category::Regions => "Barrier data organized by geographical region",
        }
    }

    /// Détermine la catégorie d'un chemin par son segment de répertoire
    ///
    /// Un chemin qui ne contient aucun des trois segments n'appartient à
    /// aucune catégorie.
    pub fn from_path(path: &str) -> Option<Category> {
        if path.contains("/types/") {
            Some(Category::Types)
        } else if path.contains("/countries/") {
            Some(Category::Countries)
        } else if path.contains("/regions/") {
            Some(Category::Regions)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CdnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "types" => Ok(Category::Types),
            "countries" => Ok(Category::Countries),
            "regions" => Ok(Category::Regions),
            other => Err(CdnError::InvalidCategory(other.to_string())),
        }
    }
}

/// Une catégorie du catalogue: description + liste de chemins relatifs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub description: String,

    /// Chemins relatifs au répertoire `data/`, uniques, dans l'ordre
    /// de première insertion
    pub files: Vec<String>,
}

impl CategoryEntry {
    fn new(category: Category) -> Self {
        Self {
            description: category.description().to_string(),
            files: Vec::new(),
        }
    }
}

/// Les trois catégories fixes du catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCategories {
    pub types: CategoryEntry,
    pub countries: CategoryEntry,
    pub regions: CategoryEntry,
}

/// Manifeste des fichiers disponibles sur le CDN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    pub description: String,

    /// Horodatage ISO-8601 de la dernière modification
    pub last_updated: String,

    pub data_categories: DataCategories,
}

impl Catalog {
    /// Crée un catalogue neuf avec les trois catégories vides
    pub fn bootstrap() -> Self {
        Self {
            name: CATALOG_NAME.to_string(),
            description: CATALOG_DESCRIPTION.to_string(),
            last_updated: Utc::now().to_rfc3339(),
            data_categories: DataCategories {
                types: CategoryEntry::new(Category::Types),
                countries: CategoryEntry::new(Category::Countries),
                regions: CategoryEntry::new(Category::Regions),
            },
        }
    }

    /// Charge le catalogue depuis le disque
    pub fn load(path: &Path) -> Result<Self, CdnError> {
        if !path.is_file() {
            return Err(CdnError::CatalogNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Réécrit le catalogue de façon atomique (fichier temporaire + rename)
    pub fn save(&self, path: &Path) -> Result<(), CdnError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Enregistre un fichier dans la catégorie déduite de son chemin
    ///
    /// Le préfixe `data/` est retiré pour stocker un chemin relatif au
    /// stockage. Un chemin déjà présent n'est pas dupliqué. Le timestamp
    /// `last_updated` est rafraîchi dans tous les cas, y compris quand le
    /// chemin n'appartient à aucune catégorie.
    pub fn register(&mut self, file_path: &str) -> Option<Category> {
        let category = Category::from_path(file_path);

        if let Some(category) = category {
            let relative = file_path.strip_prefix("data/").unwrap_or(file_path);
            let entry = self.entry_mut(category);
            if !entry.files.iter().any(|f| f == relative) {
                entry.files.push(relative.to_string());
                info!(path = relative, category = %category, "File registered in catalog");
            }
        }

        self.touch();
        category
    }

    /// Rafraîchit `last_updated` à l'instant courant
    pub fn touch(&mut self) {
        self.last_updated = Utc::now().to_rfc3339();
    }

    pub fn entry(&self, category: Category) -> &CategoryEntry {
        match category {
            Category::Types => &self.data_categories.types,
            Category::Countries => &self.data_categories.countries,
            Category::Regions => &self.data_categories.regions,
        }
    }

    fn entry_mut(&mut self, category: Category) -> &mut CategoryEntry {
        match category {
            Category::Types => &mut self.data_categories.types,
            Category::Countries => &mut self.data_categories.countries,
            Category::Regions => &mut self.data_categories.regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_path() {
        assert_eq!(
            Category::from_path("data/types/dam.geojson"),
            Some(Category::Types)
        );
        assert_eq!(
            Category::from_path("data/countries/france.geojson"),
            Some(Category::Countries)
        );
        assert_eq!(
            Category::from_path("data/regions/europe.geojson"),
            Some(Category::Regions)
        );
        assert_eq!(Category::from_path("data/misc/stuff.geojson"), None);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("types".parse::<Category>().unwrap(), Category::Types);
        assert!(matches!(
            "continent".parse::<Category>(),
            Err(CdnError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_bootstrap_has_empty_categories() {
        let catalog = Catalog::bootstrap();
        assert_eq!(catalog.name, "Barrier Data CDN");
        assert!(!catalog.last_updated.is_empty());
        for category in Category::ALL {
            assert!(catalog.entry(category).files.is_empty());
            assert!(!catalog.entry(category).description.is_empty());
        }
    }

    #[test]
    fn test_register_strips_data_prefix() {
        let mut catalog = Catalog::bootstrap();
        let category = catalog.register("data/countries/france.geojson");
        assert_eq!(category, Some(Category::Countries));
        assert_eq!(
            catalog.entry(Category::Countries).files,
            vec!["countries/france.geojson".to_string()]
        );
    }

    #[test]
    fn test_register_is_idempotent_but_touches() {
        let mut catalog = Catalog::bootstrap();
        catalog.register("data/types/dam.geojson");

        catalog.last_updated = String::new();
        catalog.register("data/types/dam.geojson");

        assert_eq!(catalog.entry(Category::Types).files.len(), 1);
        // Deuxième appel: pas de doublon, mais le timestamp avance quand même
        assert!(!catalog.last_updated.is_empty());
    }

    #[test]
    fn test_register_unknown_category_only_touches() {
        let mut catalog = Catalog::bootstrap();
        catalog.last_updated = String::new();

        assert_eq!(catalog.register("data/misc/stuff.geojson"), None);
        for category in Category::ALL {
            assert!(catalog.entry(category).files.is_empty());
        }
        assert!(!catalog.last_updated.is_empty());
    }

    #[test]
    fn test_register_preserves_insertion_order() {
        let mut catalog = Catalog::bootstrap();
        catalog.register("data/types/weir.geojson");
        catalog.register("data/types/dam.geojson");
        catalog.register("data/types/weir.geojson");

        assert_eq!(
            catalog.entry(Category::Types).files,
            vec![
                "types/weir.geojson".to_string(),
                "types/dam.geojson".to_string()
            ]
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata").join("catalog.json");

        let mut catalog = Catalog::bootstrap();
        catalog.register("data/regions/europe.geojson");
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.name, catalog.name);
        assert_eq!(
            loaded.entry(Category::Regions).files,
            vec!["regions/europe.geojson".to_string()]
        );
        // Pas de fichier temporaire résiduel
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::load(&dir.path().join("catalog.json"));
        assert!(matches!(result, Err(CdnError::CatalogNotFound(_))));
    }

    #[test]
    fn test_catalog_json_shape() {
        let catalog = Catalog::bootstrap();
        let json = serde_json::to_value(&catalog).unwrap();

        assert!(json.get("name").is_some());
        assert!(json.get("description").is_some());
        assert!(json.get("last_updated").is_some());
        let categories = json.get("data_categories").unwrap();
        for key in ["types", "countries", "regions"] {
            let entry = categories.get(key).unwrap();
            assert!(entry.get("description").is_some());
            assert!(entry.get("files").unwrap().is_array());
        }
    }
}
