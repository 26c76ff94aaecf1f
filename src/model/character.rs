use serde::{Deserialize, Serialize};

use super::traits::Trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialClass {
    Patrician,
    Plebeian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// A living (or once-living) individual supplied by the population layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub class: SocialClass,
    pub gender: Gender,
    #[serde(default)]
    pub traits: Vec<Trait>,
    pub wealth: f64,
    pub influence: f64,
    pub alive: bool,
}

impl Character {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age: 30,
            class: SocialClass::Plebeian,
            gender: Gender::Male,
            traits: Vec::new(),
            wealth: 0.0,
            influence: 0.0,
            alive: true,
        }
    }

    pub fn has_trait(&self, t: &Trait) -> bool {
        self.traits.contains(t)
    }
}
