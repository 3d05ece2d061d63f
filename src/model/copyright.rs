use serde::{Deserialize, Serialize};

use crate::model::Id;

/// A row of the `copyrights` join table: this scientist holds this device.
///
/// Ordering is by scientist first so a sorted set of copyrights groups the
/// devices of each scientist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Copyright {
    pub scientist_id: Id,
    pub device_id: Id,
}

impl Copyright {
    pub fn new(scientist_id: Id, device_id: Id) -> Self {
        Self {
            scientist_id,
            device_id,
        }
    }

    pub fn touches_scientist(&self, id: Id) -> bool {
        self.scientist_id == id
    }

    pub fn touches_device(&self, id: Id) -> bool {
        self.device_id == id
    }
}
