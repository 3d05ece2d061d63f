use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Copyright, Device, Entity, Id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scientist {
    pub id: Id,
    pub name: String,
    pub madness: i32, // measure of madness
    pub tries: i32,   // attempts to destroy the galaxy
    pub created_at: DateTime<Utc>,
}

/// Business fields of a scientist, as accepted by POST and PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScientist {
    pub name: String,
    pub madness: i32,
    pub tries: i32,
}

impl NewScientist {
    pub fn new(name: impl Into<String>, madness: i32, tries: i32) -> Self {
        Self {
            name: name.into(),
            madness,
            tries,
        }
    }

    pub fn into_scientist(self, id: Id) -> Scientist {
        Scientist {
            id,
            name: self.name,
            madness: self.madness,
            tries: self.tries,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Scientist {
    type Draft = NewScientist;
    type Related = Device;

    const COLLECTION: &'static str = "scientists";
    const FIELDS: &'static [&'static str] = &["name", "madness", "tries"];

    fn copyright(own_id: Id, related_id: Id) -> Copyright {
        Copyright::new(own_id, related_id)
    }
}
