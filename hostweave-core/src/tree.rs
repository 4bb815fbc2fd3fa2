//! Pure helpers over the nested entry list.
//!
//! The entry list is a tree (folders and groups nest via `children`); these
//! functions give services a flat view of it without touching storage.

use crate::types::HostsEntry;

/// Depth-first search for an entry by id. Returns the first match.
///
/// A miss is a normal outcome; callers fall back to create mode.
#[must_use]
pub fn find_by_id<'a>(list: &'a [HostsEntry], id: &str) -> Option<&'a HostsEntry> {
    for entry in list {
        if entry.id == id {
            return Some(entry);
        }
        if let Some(found) = find_by_id(&entry.children, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find_by_id`].
pub fn find_by_id_mut<'a>(list: &'a mut [HostsEntry], id: &str) -> Option<&'a mut HostsEntry> {
    for entry in list {
        if entry.id == id {
            return Some(entry);
        }
        if let Some(found) = find_by_id_mut(&mut entry.children, id) {
            return Some(found);
        }
    }
    None
}

/// Flatten the nested structure into a depth-first sequence.
///
/// Every node appears exactly once, parents before their children, relative
/// order preserved.
#[must_use]
pub fn flatten(list: &[HostsEntry]) -> Vec<&HostsEntry> {
    let mut flat = Vec::new();
    collect(list, &mut flat);
    flat
}

fn collect<'a>(list: &'a [HostsEntry], into: &mut Vec<&'a HostsEntry>) {
    for entry in list {
        into.push(entry);
        collect(&entry.children, into);
    }
}

/// Remove the entry with `id` wherever it nests. Returns the removed entry.
pub fn remove_by_id(list: &mut Vec<HostsEntry>, id: &str) -> Option<HostsEntry> {
    if let Some(pos) = list.iter().position(|e| e.id == id) {
        return Some(list.remove(pos));
    }
    for entry in list {
        if let Some(removed) = remove_by_id(&mut entry.children, id) {
            return Some(removed);
        }
    }
    None
}

/// Drop `id` from every group's `include` list, recursively.
pub fn scrub_include(list: &mut [HostsEntry], id: &str) {
    for entry in list {
        entry.include.retain(|member| member != id);
        scrub_include(&mut entry.children, id);
    }
}
