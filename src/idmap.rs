//! Process-wide radio ID → display name association, consulted only for
//! logging.
//!
//! Grounded on `dmr_id_name`/`dmr_id_add` (`include/dmr/id.h`): a single
//! lazily-initialised, process-wide table. The reference's `TALLOC`-arena
//! singleton becomes a `once_cell::sync::Lazy<Mutex<..>>` here, the same
//! pattern `vendors/mod.rs`'s vendor registry uses for its one piece of
//! shared mutable state.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Mutex;

static IDS: Lazy<Mutex<BTreeMap<u32, String>>> = Lazy::new(|| Mutex::new(BTreeMap::new()));

/// Associates `id` with `name`, overwriting any previous entry.
pub fn add(id: u32, name: impl Into<String>) {
    IDS.lock()
        .expect("id map mutex poisoned")
        .insert(id, name.into());
}

/// Looks up the display name for `id`, if one was ever added.
pub fn name(id: u32) -> Option<String> {
    IDS.lock().expect("id map mutex poisoned").get(&id).cloned()
}

/// Removes every entry, as done at shutdown.
pub fn clear() {
    IDS.lock().expect("id map mutex poisoned").clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_lookup() {
        clear();
        add(0x112233, "W1AW");
        assert_eq!(name(0x112233).as_deref(), Some("W1AW"));
        assert_eq!(name(0x999999), None);
        clear();
    }
}
