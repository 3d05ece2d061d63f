use crate::model::{Copyright, Device, Entity, Id, NewDevice, NewScientist, Scientist};
use crate::store::traits::{EntityStore, Store, StoreResult};

const SCIENTISTS: &[(&str, i32, i32)] = &[
    ("Bob", 5, 0),
    ("Amy", 0, 0),
    ("Victor Frankenstein", 90, 12),
];

const DEVICES: &[(&str, i32)] = &[("Bomb", 100), ("Death Ray", 250), ("Reanimator", 40)];

/// (scientist name, device name)
const COPYRIGHTS: &[(&str, &str)] = &[
    ("Bob", "Bomb"),
    ("Victor Frankenstein", "Reanimator"),
    ("Victor Frankenstein", "Death Ray"),
];

/// Create a record unless one with the same name already exists.
async fn ensure<S, E>(
    store: &S,
    name: &str,
    draft: E::Draft,
    existing: &[(String, Id)],
) -> StoreResult<Id>
where
    S: EntityStore<E>,
    E: Entity,
{
    if let Some((_, id)) = existing.iter().find(|(n, _)| n == name) {
        return Ok(*id);
    }
    EntityStore::<E>::create(store, draft).await
}

/// Load a small demonstration data set. Records whose names already exist
/// are reused, so loading twice is harmless.
pub async fn load_seed_data<S: Store>(store: &S) -> StoreResult<()> {
    let known_scientists: Vec<(String, Id)> = EntityStore::<Scientist>::list(store)
        .await?
        .into_iter()
        .map(|s| (s.name, s.id))
        .collect();
    let known_devices: Vec<(String, Id)> = EntityStore::<Device>::list(store)
        .await?
        .into_iter()
        .map(|d| (d.name, d.id))
        .collect();

    let mut scientists = Vec::new();
    for (name, madness, tries) in SCIENTISTS {
        let draft = NewScientist::new(*name, *madness, *tries);
        let id = ensure::<S, Scientist>(store, name, draft, &known_scientists).await?;
        scientists.push((name.to_string(), id));
    }

    let mut devices = Vec::new();
    for (name, power) in DEVICES {
        let draft = NewDevice::new(*name, *power);
        let id = ensure::<S, Device>(store, name, draft, &known_devices).await?;
        devices.push((name.to_string(), id));
    }

    for (scientist, device) in COPYRIGHTS {
        let scientist_id = scientists.iter().find(|(n, _)| n == scientist).map(|(_, id)| *id);
        let device_id = devices.iter().find(|(n, _)| n == device).map(|(_, id)| *id);
        if let (Some(scientist_id), Some(device_id)) = (scientist_id, device_id) {
            store.relate(Copyright::new(scientist_id, device_id)).await?;
        }
    }

    log::info!(
        "Seed data ready: {} scientists, {} devices, {} copyrights",
        scientists.len(),
        devices.len(),
        COPYRIGHTS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let store = MemoryStore::new();
        load_seed_data(&store).await.unwrap();
        load_seed_data(&store).await.unwrap();

        let scientists = EntityStore::<Scientist>::list(&store).await.unwrap();
        let devices = EntityStore::<Device>::list(&store).await.unwrap();
        assert_eq!(scientists.len(), SCIENTISTS.len());
        assert_eq!(devices.len(), DEVICES.len());
        assert_eq!(store.copyright_count(), COPYRIGHTS.len());
    }
}
