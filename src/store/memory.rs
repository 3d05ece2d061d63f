use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    Copyright, Device, Id, NewDevice, NewScientist, Scientist, MAX_NAME_CHARS,
};
use crate::store::traits::{CopyrightStore, EntityStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    scientists: BTreeMap<Id, Scientist>,
    devices: BTreeMap<Id, Device>,
    copyrights: BTreeSet<Copyright>,
    last_scientist_id: Id,
    last_device_id: Id,
}

/// In-process store enforcing the same constraints as the Postgres schema.
///
/// Ids are assigned from 1 upwards per table and never reused, like a
/// `SERIAL` column.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copyright_count(&self) -> usize {
        self.tables.read().copyrights.len()
    }
}

fn check_name<'a>(name: &str, mut taken: impl Iterator<Item = &'a str>) -> StoreResult<()> {
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_NAME_CHARS {
        return Err(StoreError::ConstraintViolation(format!(
            "name must be between 1 and {} characters",
            MAX_NAME_CHARS
        )));
    }
    if taken.any(|existing| existing == name) {
        return Err(StoreError::ConstraintViolation(format!(
            "name '{}' already exists",
            name
        )));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: i32) -> StoreResult<()> {
    if value < 0 {
        return Err(StoreError::ConstraintViolation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

fn check_scientist(tables: &Tables, draft: &NewScientist, except: Option<Id>) -> StoreResult<()> {
    check_name(
        &draft.name,
        tables
            .scientists
            .values()
            .filter(|s| Some(s.id) != except)
            .map(|s| s.name.as_str()),
    )?;
    check_non_negative("madness", draft.madness)?;
    check_non_negative("tries", draft.tries)
}

fn check_device(tables: &Tables, draft: &NewDevice, except: Option<Id>) -> StoreResult<()> {
    check_name(
        &draft.name,
        tables
            .devices
            .values()
            .filter(|d| Some(d.id) != except)
            .map(|d| d.name.as_str()),
    )?;
    check_non_negative("power", draft.power)
}

#[async_trait::async_trait]
impl EntityStore<Scientist> for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Scientist>> {
        Ok(self.tables.read().scientists.values().cloned().collect())
    }

    async fn get(&self, id: Id) -> StoreResult<Option<Scientist>> {
        Ok(self.tables.read().scientists.get(&id).cloned())
    }

    async fn create(&self, draft: NewScientist) -> StoreResult<Id> {
        let mut tables = self.tables.write();
        check_scientist(&tables, &draft, None)?;
        tables.last_scientist_id += 1;
        let id = tables.last_scientist_id;
        tables.scientists.insert(id, draft.into_scientist(id));
        Ok(id)
    }

    async fn update(&self, id: Id, draft: NewScientist) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.scientists.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        check_scientist(&tables, &draft, Some(id))?;
        if let Some(scientist) = tables.scientists.get_mut(&id) {
            scientist.name = draft.name;
            scientist.madness = draft.madness;
            scientist.tries = draft.tries;
        }
        Ok(())
    }

    async fn delete(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.scientists.remove(&id).is_some() {
            tables.copyrights.retain(|c| !c.touches_scientist(id));
        }
        Ok(())
    }

    async fn list_related(&self, id: Id) -> StoreResult<Vec<Device>> {
        let tables = self.tables.read();
        Ok(tables
            .copyrights
            .iter()
            .filter(|c| c.touches_scientist(id))
            .filter_map(|c| tables.devices.get(&c.device_id).cloned())
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityStore<Device> for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Device>> {
        Ok(self.tables.read().devices.values().cloned().collect())
    }

    async fn get(&self, id: Id) -> StoreResult<Option<Device>> {
        Ok(self.tables.read().devices.get(&id).cloned())
    }

    async fn create(&self, draft: NewDevice) -> StoreResult<Id> {
        let mut tables = self.tables.write();
        check_device(&tables, &draft, None)?;
        tables.last_device_id += 1;
        let id = tables.last_device_id;
        tables.devices.insert(id, draft.into_device(id));
        Ok(id)
    }

    async fn update(&self, id: Id, draft: NewDevice) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.devices.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        check_device(&tables, &draft, Some(id))?;
        if let Some(device) = tables.devices.get_mut(&id) {
            device.name = draft.name;
            device.power = draft.power;
        }
        Ok(())
    }

    async fn delete(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.devices.remove(&id).is_some() {
            tables.copyrights.retain(|c| !c.touches_device(id));
        }
        Ok(())
    }

    async fn list_related(&self, id: Id) -> StoreResult<Vec<Scientist>> {
        let tables = self.tables.read();
        let mut scientists: Vec<Scientist> = tables
            .copyrights
            .iter()
            .filter(|c| c.touches_device(id))
            .filter_map(|c| tables.scientists.get(&c.scientist_id).cloned())
            .collect();
        scientists.sort_by_key(|s| s.id);
        Ok(scientists)
    }
}

#[async_trait::async_trait]
impl CopyrightStore for MemoryStore {
    async fn relate(&self, copyright: Copyright) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.scientists.contains_key(&copyright.scientist_id) {
            return Err(StoreError::NotFound(copyright.scientist_id));
        }
        if !tables.devices.contains_key(&copyright.device_id) {
            return Err(StoreError::NotFound(copyright.device_id));
        }
        tables.copyrights.insert(copyright);
        Ok(())
    }

    async fn unrelate(&self, copyright: Copyright) -> StoreResult<()> {
        self.tables.write().copyrights.remove(&copyright);
        Ok(())
    }
}
