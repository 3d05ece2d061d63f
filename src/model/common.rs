/// Primary key of a scientist or a device (a `SERIAL` column in the store).
pub type Id = i32;

/// Longest name accepted by the store (`VARCHAR(40)`).
pub const MAX_NAME_CHARS: usize = 40;

/// Parse a raw path segment into an id.
///
/// A segment that is not an integer cannot name an existing record, so the
/// callers treat `None` the same way as a missing record.
pub fn parse_id(raw: &str) -> Option<Id> {
    raw.trim().parse::<Id>().ok()
}
