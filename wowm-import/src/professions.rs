//! Profession table
//!
//! Maps free-text profession tokens (English or Spanish, with or without
//! accents) to the 14 canonical English profession names. Membership and
//! normalization are both answered from [`PROFESSION_SYNONYMS`] so the two
//! cannot drift apart.

use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical profession
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    Alchemy,
    Blacksmithing,
    Enchanting,
    Engineering,
    Herbalism,
    Inscription,
    Jewelcrafting,
    Leatherworking,
    Mining,
    Skinning,
    Tailoring,
    Cooking,
    Fishing,
    Archaeology,
}

/// Canonical profession with every accepted spelling (lowercase)
pub const PROFESSION_SYNONYMS: &[(Profession, &[&str])] = &[
    (Profession::Alchemy, &["alchemy", "alquimia"]),
    (Profession::Blacksmithing, &["blacksmithing", "herrería", "herreria"]),
    (Profession::Enchanting, &["enchanting", "encantamiento"]),
    (Profession::Engineering, &["engineering", "ingeniería", "ingenieria"]),
    (Profession::Herbalism, &["herbalism", "herboristería", "herboristeria"]),
    (Profession::Inscription, &["inscription", "inscripción", "inscripcion"]),
    (Profession::Jewelcrafting, &["jewelcrafting", "joyería", "joyeria"]),
    (Profession::Leatherworking, &["leatherworking", "peletería", "peleteria", "pelambre"]),
    (Profession::Mining, &["mining", "minería", "mineria"]),
    (Profession::Skinning, &["skinning", "desuello"]),
    (Profession::Tailoring, &["tailoring", "sastrería", "sastreria"]),
    (Profession::Cooking, &["cooking", "cocina"]),
    (Profession::Fishing, &["fishing", "pesca"]),
    (Profession::Archaeology, &["archaeology", "arqueología", "arqueologia"]),
];

impl Profession {
    /// All professions in table order
    pub fn all() -> impl Iterator<Item = Profession> {
        PROFESSION_SYNONYMS.iter().map(|(profession, _)| *profession)
    }

    /// Canonical English name, as sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Alchemy => "Alchemy",
            Profession::Blacksmithing => "Blacksmithing",
            Profession::Enchanting => "Enchanting",
            Profession::Engineering => "Engineering",
            Profession::Herbalism => "Herbalism",
            Profession::Inscription => "Inscription",
            Profession::Jewelcrafting => "Jewelcrafting",
            Profession::Leatherworking => "Leatherworking",
            Profession::Mining => "Mining",
            Profession::Skinning => "Skinning",
            Profession::Tailoring => "Tailoring",
            Profession::Cooking => "Cooking",
            Profession::Fishing => "Fishing",
            Profession::Archaeology => "Archaeology",
        }
    }

    /// Resolve a token against the synonym table (case-insensitive)
    pub fn from_keyword(token: &str) -> Option<Profession> {
        let needle = token.trim().to_lowercase();
        PROFESSION_SYNONYMS
            .iter()
            .find(|(_, synonyms)| synonyms.contains(&needle.as_str()))
            .map(|(profession, _)| *profession)
    }

    /// Accepted spellings for this profession
    pub fn synonyms(&self) -> &'static [&'static str] {
        PROFESSION_SYNONYMS
            .iter()
            .find(|(profession, _)| profession == self)
            .map(|(_, synonyms)| *synonyms)
            .unwrap_or(&[])
    }
}

/// True if `token` is any accepted profession spelling
pub fn is_profession_keyword(token: &str) -> bool {
    Profession::from_keyword(token).is_some()
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profession {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::from_keyword(s).ok_or_else(|| ImportError::UnknownProfession(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_profession_once() {
        let all: Vec<_> = Profession::all().collect();
        assert_eq!(all.len(), 14);
        for profession in &all {
            assert_eq!(all.iter().filter(|p| *p == profession).count(), 1);
        }
    }

    #[test]
    fn test_english_name_is_a_synonym_of_itself() {
        for profession in Profession::all() {
            assert_eq!(Profession::from_keyword(profession.as_str()), Some(profession));
        }
    }

    #[test]
    fn test_synonyms_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for (_, synonyms) in PROFESSION_SYNONYMS {
            for synonym in *synonyms {
                assert_eq!(*synonym, synonym.to_lowercase());
                assert!(seen.insert(*synonym), "duplicate synonym {}", synonym);
            }
        }
    }

    #[test]
    fn test_spanish_synonyms() {
        assert_eq!(Profession::from_keyword("Alquimia"), Some(Profession::Alchemy));
        assert_eq!(Profession::from_keyword("HERRERÍA"), Some(Profession::Blacksmithing));
        assert_eq!(Profession::from_keyword("joyeria"), Some(Profession::Jewelcrafting));
        assert_eq!(Profession::from_keyword("Pelambre"), Some(Profession::Leatherworking));
        assert_eq!(Profession::from_keyword("arqueología"), Some(Profession::Archaeology));
    }

    #[test]
    fn test_unknown_token() {
        assert!(!is_profession_keyword("decor"));
        assert!(!is_profession_keyword("of Doom"));
        assert!(matches!(
            "Bard".parse::<Profession>(),
            Err(ImportError::UnknownProfession(name)) if name == "Bard"
        ));
    }

    #[test]
    fn test_serializes_as_canonical_name() {
        let json = serde_json::to_string(&Profession::Jewelcrafting).unwrap();
        assert_eq!(json, "\"Jewelcrafting\"");
        assert_eq!(Profession::Jewelcrafting.synonyms(), &["jewelcrafting", "joyería", "joyeria"]);
    }
}
