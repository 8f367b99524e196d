//! Valeurs scalaires normalisées à la frontière avec la source de données
//!
//! Les cellules tabulaires (numérique, décimal, texte, NULL) sont converties
//! une seule fois en [`Value`] lors de l'ingestion. Tout le reste du pipeline
//! manipule cette union fermée, sans inspection de type ouverte.

/// Valeur scalaire JSON-compatible
///
/// Règle de normalisation: les colonnes SQL décimales/flottantes deviennent
/// `Number`, le NULL SQL devient `Null`, tout le reste (entiers, dates,
/// texte) devient `Text` via sa représentation textuelle.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Coercition en flottant: `Number` passe tel quel, `Text` est parsé
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Conversion en valeur `serde_json`
    ///
    /// Un `Number` non représentable en JSON (NaN, infini) devient `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
