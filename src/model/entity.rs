use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{Copyright, Id};

/// A persisted record type exposed as a REST collection.
///
/// Scientists and devices implement this symmetrically, which lets the router
/// and the store derive both endpoint families from one generic
/// implementation. `Related` is the entity on the other side of the
/// `copyrights` join.
pub trait Entity: Serialize + Send + Sync + 'static {
    /// Writable business fields, deserialized from a validated request body.
    type Draft: DeserializeOwned + Send + Sync + 'static;
    type Related: Entity;

    /// Path segment and list envelope key, e.g. `"scientists"`.
    const COLLECTION: &'static str;
    /// Fields a POST or PUT body must carry, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Join key for a record of this type and a record of the related type.
    fn copyright(own_id: Id, related_id: Id) -> Copyright;
}
