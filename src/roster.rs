use std::collections::BTreeMap;

use serde::Deserialize;

use crate::model::{Character, Gender, SocialClass, Trait};

/// Source of the individuals who can stand for office.
///
/// Implementations must yield characters in a stable order (ascending id for
/// `Roster`); declaration and voting iterate in this order.
pub trait CharacterProvider {
    fn characters(&self) -> Vec<&Character>;
    fn character(&self, id: u64) -> Option<&Character>;
}

/// In-memory character set keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: BTreeMap<u64, Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a character.
    pub fn insert(&mut self, character: Character) {
        self.characters.insert(character.id, character);
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Mark a character dead. Returns false if the id is unknown or already dead.
    pub fn mark_dead(&mut self, id: u64) -> bool {
        match self.characters.get_mut(&id) {
            Some(c) if c.alive => {
                c.alive = false;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Load the game's roster document (`{"Characters": [...]}`).
    ///
    /// When `reference_year` is given, ages are recomputed from `BirthYear`; otherwise
    /// the stored `Age` is used. Entries that fail to parse are skipped with a warning.
    pub fn from_json(json: &str, reference_year: Option<i32>) -> Result<Self, serde_json::Error> {
        let document: RosterDocument = serde_json::from_str(json)?;
        let mut roster = Self::new();
        for (position, value) in document.characters.into_iter().enumerate() {
            let entry = match serde_json::from_value::<RosterEntry>(value) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping malformed roster entry #{position}: {err}");
                    continue;
                }
            };
            if roster.characters.contains_key(&entry.id) {
                tracing::warn!("skipping duplicate roster id {}", entry.id);
                continue;
            }
            match entry.into_character(reference_year) {
                Some(character) => roster.insert(character),
                None => {
                    tracing::warn!("skipping roster entry #{position}: unknown class or gender")
                }
            }
        }
        Ok(roster)
    }
}

impl CharacterProvider for Roster {
    fn characters(&self) -> Vec<&Character> {
        self.characters.values().collect()
    }

    fn character(&self, id: u64) -> Option<&Character> {
        self.characters.get(&id)
    }
}

#[derive(Deserialize)]
struct RosterDocument {
    #[serde(rename = "Characters")]
    characters: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RosterEntry {
    #[serde(rename = "ID")]
    id: u64,
    roman_name: RomanName,
    gender: u8,
    birth_year: Option<i32>,
    #[serde(default)]
    age: u32,
    #[serde(default = "default_alive")]
    is_alive: bool,
    class: u8,
    #[serde(default)]
    traits: Vec<Trait>,
    #[serde(default)]
    wealth: f64,
    #[serde(default)]
    influence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RomanName {
    praenomen: Option<String>,
    nomen: Option<String>,
    cognomen: Option<String>,
}

fn default_alive() -> bool {
    true
}

impl RomanName {
    fn display(&self) -> String {
        [&self.praenomen, &self.nomen, &self.cognomen]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl RosterEntry {
    fn into_character(self, reference_year: Option<i32>) -> Option<Character> {
        let gender = match self.gender {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => return None,
        };
        let class = match self.class {
            0 => SocialClass::Patrician,
            1 => SocialClass::Plebeian,
            _ => return None,
        };
        let age = match (reference_year, self.birth_year) {
            (Some(year), Some(born)) => (year - born).max(0) as u32,
            _ => self.age,
        };
        Some(Character {
            id: self.id,
            name: self.roman_name.display(),
            age,
            class,
            gender,
            traits: self.traits,
            wealth: self.wealth,
            influence: self.influence,
            alive: self.is_alive,
        })
    }
}
