//! Record types the CLI fetches and stores.

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use simpleapi_core::Record;

/// A pet, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub age: u32,
}

impl Record for Pet {
    const KIND: &'static str = "pet";

    fn identity(&self) -> String {
        self.name.clone()
    }
}

#[derive(Tabled)]
pub struct PetRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Age")]
    pub age: u32,
}

impl From<&Pet> for PetRow {
    fn from(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            kind: pet.kind.clone(),
            age: pet.age,
        }
    }
}
