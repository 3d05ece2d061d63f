use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Copyright, Entity, Id, Scientist};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Id,
    pub name: String,
    pub power: i32, // measure of destructive power
    pub created_at: DateTime<Utc>,
}

/// Business fields of a device, as accepted by POST and PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub power: i32,
}

impl NewDevice {
    pub fn new(name: impl Into<String>, power: i32) -> Self {
        Self {
            name: name.into(),
            power,
        }
    }

    pub fn into_device(self, id: Id) -> Device {
        Device {
            id,
            name: self.name,
            power: self.power,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Device {
    type Draft = NewDevice;
    type Related = Scientist;

    const COLLECTION: &'static str = "devices";
    const FIELDS: &'static [&'static str] = &["name", "power"];

    fn copyright(own_id: Id, related_id: Id) -> Copyright {
        Copyright::new(related_id, own_id)
    }
}
