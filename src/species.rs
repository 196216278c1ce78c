//! # Species — Table Family Classification
//!
//! Maps a species name to the regulatory sampling table that applies to it.
//! The species lists follow the official SAG-USDA classification; names are
//! matched case-insensitively after trimming. Anything not listed, including
//! an empty or missing name, falls into the percentage-based family.

use serde::{Deserialize, Serialize};

/// The four regulatory table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFamily {
    /// Hypergeometric table, 3% infestation at 95% confidence.
    Hypergeometric3,
    /// Hypergeometric table, 6% infestation at 95% confidence. Capped at 49.
    Hypergeometric6,
    Biometric,
    Percentage,
}

impl TableFamily {
    pub const ALL: [TableFamily; 4] = [
        TableFamily::Hypergeometric3,
        TableFamily::Hypergeometric6,
        TableFamily::Biometric,
        TableFamily::Percentage,
    ];

    /// Official table name as printed on inspection documents.
    pub fn display_name(&self) -> &'static str {
        match self {
            TableFamily::Hypergeometric3 => "Hipergeométrica del 3%",
            TableFamily::Hypergeometric6 => "Hipergeométrica del 6%",
            TableFamily::Biometric => "Biométrica",
            TableFamily::Percentage => "Porcentual 2%",
        }
    }

    /// The species names that select this family. Empty for the percentage
    /// family, which is the fallback.
    pub fn species(&self) -> &'static [&'static str] {
        match self {
            TableFamily::Hypergeometric3 => HYPERGEOMETRIC_3_SPECIES,
            TableFamily::Hypergeometric6 => HYPERGEOMETRIC_6_SPECIES,
            TableFamily::Biometric => BIOMETRIC_SPECIES,
            TableFamily::Percentage => &[],
        }
    }
}

impl std::fmt::Display for TableFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFamily::Hypergeometric3 => write!(f, "hypergeometric_3"),
            TableFamily::Hypergeometric6 => write!(f, "hypergeometric_6"),
            TableFamily::Biometric => write!(f, "biometric"),
            TableFamily::Percentage => write!(f, "percentage"),
        }
    }
}

/// Apricot without authorized cold treatment.
const HYPERGEOMETRIC_3_SPECIES: &[&str] = &["Damasco", "Damascos"];

/// Stone fruit and berries, including apricot under cold treatment.
const HYPERGEOMETRIC_6_SPECIES: &[&str] = &[
    "Ciruela",
    "Ciruelas",
    "Damasco_condicional",
    "Durazno",
    "Duraznos",
    "Nectarino",
    "Nectarinos",
    "Nectarin",
    "Nectarines",
    "Plumcot",
    "Plumcots",
    "Uchuva",
    "Uchuvas",
    "Cranberry",
    "Cranberries",
];

/// Pome fruit, citrus, kiwi and cherimoya under the systems approach.
const BIOMETRIC_SPECIES: &[&str] = &[
    "Manzana",
    "Manzanas",
    "Pera",
    "Peras",
    "Pera Asiática",
    "Peras Asiáticas",
    "Clementina",
    "Clementinas",
    "Tangerina",
    "Tangerinas",
    "Mandarina",
    "Mandarinas",
    "Naranja",
    "Naranjas",
    "Granada",
    "Granadas",
    "Baby Kiwi",
    "Baby Kiwis",
    "Kiwi",
    "Kiwis",
    "Pomelo",
    "Pomelos",
    "Limón",
    "Limones",
    "Chirimoya_condicional",
    "Chirimoyas_condicional",
];

/// Classify a species name into its table family. Never fails.
pub fn classify_species(name: Option<&str>) -> TableFamily {
    let normalized = match name {
        Some(n) => n.trim().to_lowercase(),
        None => return TableFamily::Percentage,
    };
    if normalized.is_empty() {
        return TableFamily::Percentage;
    }

    let listed = |list: &[&str]| list.iter().any(|s| s.to_lowercase() == normalized);
    if listed(HYPERGEOMETRIC_3_SPECIES) {
        TableFamily::Hypergeometric3
    } else if listed(HYPERGEOMETRIC_6_SPECIES) {
        TableFamily::Hypergeometric6
    } else if listed(BIOMETRIC_SPECIES) {
        TableFamily::Biometric
    } else {
        TableFamily::Percentage
    }
}
