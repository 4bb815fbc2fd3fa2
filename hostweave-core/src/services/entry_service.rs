//! Entry management service

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::tree;
use crate::types::{EntryKind, HostsEntry, SaveEntryRequest};

/// Entry management service
///
/// Owns all reads and writes of the nested entry list. Edits are applied as
/// whole-record replacements followed by a single atomic list write, so
/// readers never observe a partially merged entry.
pub struct EntryService {
    ctx: Arc<ServiceContext>,
}

impl EntryService {
    /// Create an entry service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// List the full nested entry tree
    pub async fn list_entries(&self) -> CoreResult<Vec<HostsEntry>> {
        self.ctx.entry_repository.find_all().await
    }

    /// Get an entry by id, searching nested children depth-first
    ///
    /// A miss is a normal outcome (the caller falls back to create mode),
    /// so this returns `None` rather than an error.
    pub async fn get_entry(&self, entry_id: &str) -> CoreResult<Option<HostsEntry>> {
        let list = self.ctx.entry_repository.find_all().await?;
        Ok(tree::find_by_id(&list, entry_id).cloned())
    }

    /// Flat candidate list for group membership selection.
    ///
    /// Expands the nested structure depth-first and keeps only `local` and
    /// `remote` entries; group and folder nodes are not selectable members.
    pub async fn member_candidates(&self) -> CoreResult<Vec<HostsEntry>> {
        let list = self.ctx.entry_repository.find_all().await?;
        Ok(tree::flatten(&list)
            .into_iter()
            .filter(|e| matches!(e.kind, EntryKind::Local | EntryKind::Remote))
            .cloned()
            .collect())
    }

    /// Create or edit an entry.
    ///
    /// `title` and `url` are trimmed before anything is stored. With no `id`
    /// the entry is created; with an `id` the provided keys are merged into
    /// the stored record. A stale `id` (referencing a deleted entry) falls
    /// back to create mode and retries the save once, producing a new id
    /// instead of silently resurrecting the old one.
    pub async fn save_entry(&self, request: SaveEntryRequest) -> CoreResult<HostsEntry> {
        let request = request.trimmed();
        let _write = self.ctx.entry_write_lock.lock().await;
        let mut list = self.ctx.entry_repository.find_all().await?;

        if let Some(ref entry_id) = request.id {
            if let Some(existing) = tree::find_by_id_mut(&mut list, entry_id) {
                if let Some(kind) = request.kind {
                    if kind != existing.kind {
                        return Err(CoreError::ValidationError(format!(
                            "entry kind is immutable: {entry_id}"
                        )));
                    }
                }

                // New record from the old plus the change set, swapped in whole.
                let mut updated = existing.clone();
                request.apply_to(&mut updated);
                *existing = updated.clone();

                self.ctx.entry_repository.save_all(&list).await?;
                return Ok(updated);
            }

            log::warn!("save_entry: unknown entry id {entry_id}, falling back to create");
        }

        self.create_entry(request, list).await
    }

    /// Append a new entry at the top level of the list.
    async fn create_entry(
        &self,
        request: SaveEntryRequest,
        mut list: Vec<HostsEntry>,
    ) -> CoreResult<HostsEntry> {
        let id = uuid::Uuid::new_v4().to_string();
        let kind = request.kind.unwrap_or(EntryKind::Local);

        let mut entry = HostsEntry::new(id, kind);
        request.apply_to(&mut entry);

        list.push(entry.clone());
        self.ctx.entry_repository.save_all(&list).await?;

        log::info!("created entry {} ({:?})", entry.id, entry.kind);
        Ok(entry)
    }

    /// Delete an entry wherever it nests.
    ///
    /// Removes the whole subtree, scrubs every removed id from group
    /// `include` lists, and drops stored content. Content cleanup is a soft
    /// failure: the entry is already gone from the list.
    pub async fn delete_entry(&self, entry_id: &str) -> CoreResult<()> {
        let _write = self.ctx.entry_write_lock.lock().await;
        let mut list = self.ctx.entry_repository.find_all().await?;

        let removed = tree::remove_by_id(&mut list, entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;

        let removed_subtree = [removed];
        let removed_ids: Vec<String> = tree::flatten(&removed_subtree)
            .into_iter()
            .map(|e| e.id.clone())
            .collect();

        for id in &removed_ids {
            tree::scrub_include(&mut list, id);
        }

        self.ctx.entry_repository.save_all(&list).await?;

        for id in &removed_ids {
            if let Err(e) = self.ctx.content_store.remove(id).await {
                log::warn!("failed to remove content for deleted entry {id}: {e}");
            }
        }

        Ok(())
    }

    /// Resolve an entry's hosts content.
    ///
    /// Local and remote entries read from the content store (empty when
    /// nothing is stored yet). A group is the union of its members' resolved
    /// content in `include` order; a folder is the union over its children.
    /// Every entry contributes at most once, even through membership cycles.
    pub async fn resolve_content(&self, entry_id: &str) -> CoreResult<String> {
        let list = self.ctx.entry_repository.find_all().await?;
        let entry = tree::find_by_id(&list, entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;

        let mut visited = HashSet::new();
        let mut leaf_ids = Vec::new();
        collect_leaves(&list, entry, &mut visited, &mut leaf_ids);

        let mut parts = Vec::with_capacity(leaf_ids.len());
        for id in leaf_ids {
            parts.push(self.ctx.content_store.get(id).await?.unwrap_or_default());
        }
        Ok(parts.join("\n"))
    }
}

/// Collect the content-bearing leaves reachable from `entry`, depth-first,
/// deduplicated by id.
fn collect_leaves<'a>(
    list: &'a [HostsEntry],
    entry: &'a HostsEntry,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<&'a str>,
) {
    if !visited.insert(entry.id.as_str()) {
        return;
    }
    match entry.kind {
        EntryKind::Local | EntryKind::Remote => out.push(entry.id.as_str()),
        EntryKind::Group => {
            for member_id in &entry.include {
                if let Some(member) = tree::find_by_id(list, member_id) {
                    collect_leaves(list, member, visited, out);
                } else {
                    log::debug!("group {} references missing entry {member_id}", entry.id);
                }
            }
        }
        EntryKind::Folder => {
            for child in &entry.children {
                collect_leaves(list, child, visited, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_entry_service, make_entry, make_remote_entry};
    use crate::traits::{ContentStore, EntryRepository};

    fn save_request(kind: EntryKind, title: &str) -> SaveEntryRequest {
        SaveEntryRequest {
            kind: Some(kind),
            title: Some(title.to_string()),
            ..SaveEntryRequest::default()
        }
    }

    #[tokio::test]
    async fn create_trims_title_and_url() {
        let (svc, _, _, _) = create_test_entry_service();

        let saved = svc
            .save_entry(SaveEntryRequest {
                kind: Some(EntryKind::Remote),
                title: Some("  my list  ".to_string()),
                url: Some("  https://example.com/hosts  ".to_string()),
                ..SaveEntryRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(saved.title, "my list");
        assert_eq!(saved.url.as_deref(), Some("https://example.com/hosts"));
    }

    #[tokio::test]
    async fn create_appends_with_fresh_id() {
        let (svc, entry_repo, _, _) = create_test_entry_service();

        let a = svc
            .save_entry(save_request(EntryKind::Local, "a"))
            .await
            .unwrap();
        let b = svc
            .save_entry(save_request(EntryKind::Local, "b"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        let list = entry_repo.find_all().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].title, "b");
    }

    #[tokio::test]
    async fn edit_merges_only_provided_keys() {
        let (svc, entry_repo, _, _) = create_test_entry_service();

        let mut entry = make_remote_entry("r1", "https://example.com/hosts");
        entry.title = "before".to_string();
        entry.refresh_interval = 3600;
        entry.last_refresh_ms = Some(42);
        entry_repo.save_all(&[entry]).await.unwrap();

        let saved = svc
            .save_entry(SaveEntryRequest {
                id: Some("r1".to_string()),
                title: Some("after".to_string()),
                ..SaveEntryRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(saved.title, "after");
        assert_eq!(saved.url.as_deref(), Some("https://example.com/hosts"));
        assert_eq!(saved.refresh_interval, 3600);
        // save never touches refresh metadata
        assert_eq!(saved.last_refresh_ms, Some(42));
    }

    #[tokio::test]
    async fn edit_nested_entry_in_place() {
        let (svc, entry_repo, _, _) = create_test_entry_service();

        let mut folder = make_entry("f1", EntryKind::Folder);
        folder.children = vec![make_entry("a", EntryKind::Local)];
        entry_repo.save_all(&[folder]).await.unwrap();

        svc.save_entry(SaveEntryRequest {
            id: Some("a".to_string()),
            title: Some("renamed".to_string()),
            ..SaveEntryRequest::default()
        })
        .await
        .unwrap();

        let list = entry_repo.find_all().await.unwrap();
        assert_eq!(tree::find_by_id(&list, "a").unwrap().title, "renamed");
        // no duplicate appeared at the top level
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn edit_rejects_kind_change() {
        let (svc, entry_repo, _, _) = create_test_entry_service();
        entry_repo
            .save_all(&[make_entry("a", EntryKind::Local)])
            .await
            .unwrap();

        let result = svc
            .save_entry(SaveEntryRequest {
                id: Some("a".to_string()),
                kind: Some(EntryKind::Remote),
                ..SaveEntryRequest::default()
            })
            .await;

        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn stale_id_falls_back_to_create() {
        let (svc, entry_repo, _, _) = create_test_entry_service();
        entry_repo
            .save_all(&[make_entry("a", EntryKind::Local)])
            .await
            .unwrap();

        let saved = svc
            .save_entry(SaveEntryRequest {
                id: Some("deleted-long-ago".to_string()),
                kind: Some(EntryKind::Local),
                title: Some("recovered".to_string()),
                ..SaveEntryRequest::default()
            })
            .await
            .unwrap();

        // a new id, not the stale one, and no duplicate under the old id
        assert_ne!(saved.id, "deleted-long-ago");
        let list = entry_repo.find_all().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(tree::find_by_id(&list, "deleted-long-ago").is_none());
        assert_eq!(tree::find_by_id(&list, &saved.id).unwrap().title, "recovered");
    }

    #[tokio::test]
    async fn member_candidates_excludes_containers() {
        let (svc, entry_repo, _, _) = create_test_entry_service();

        let mut group = make_entry("g1", EntryKind::Group);
        group.children = vec![make_remote_entry("b", "https://example.com/b")];
        let mut folder = make_entry("f1", EntryKind::Folder);
        folder.children = vec![make_entry("a", EntryKind::Local), group];
        entry_repo
            .save_all(&[folder, make_entry("c", EntryKind::Local)])
            .await
            .unwrap();

        let ids: Vec<String> = svc
            .member_candidates()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn get_entry_missing_is_none() {
        let (svc, _, _, _) = create_test_entry_service();
        assert!(svc.get_entry("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_scrubs_group_references_and_content() {
        let (svc, entry_repo, content_store, _) = create_test_entry_service();

        let mut group = make_entry("g1", EntryKind::Group);
        group.include = vec!["a".to_string(), "b".to_string()];
        entry_repo
            .save_all(&[
                make_entry("a", EntryKind::Local),
                make_entry("b", EntryKind::Local),
                group,
            ])
            .await
            .unwrap();
        content_store.set("a", "1.2.3.4 example.test").await.unwrap();

        svc.delete_entry("a").await.unwrap();

        let list = entry_repo.find_all().await.unwrap();
        assert!(tree::find_by_id(&list, "a").is_none());
        assert_eq!(tree::find_by_id(&list, "g1").unwrap().include, vec!["b"]);
        assert!(content_store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_entry_fails() {
        let (svc, _, _, _) = create_test_entry_service();
        let result = svc.delete_entry("ghost").await;
        assert!(matches!(result, Err(CoreError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn resolve_group_unions_members_in_include_order() {
        let (svc, entry_repo, content_store, _) = create_test_entry_service();

        let mut group = make_entry("g1", EntryKind::Group);
        group.include = vec!["b".to_string(), "a".to_string()];
        entry_repo
            .save_all(&[
                make_entry("a", EntryKind::Local),
                make_entry("b", EntryKind::Local),
                group,
            ])
            .await
            .unwrap();
        content_store.set("a", "# a").await.unwrap();
        content_store.set("b", "# b").await.unwrap();

        let content = svc.resolve_content("g1").await.unwrap();
        assert_eq!(content, "# b\n# a");
    }

    #[tokio::test]
    async fn resolve_survives_membership_cycles() {
        let (svc, entry_repo, content_store, _) = create_test_entry_service();

        // g1 includes g2 and a; g2 includes g1 back
        let mut g1 = make_entry("g1", EntryKind::Group);
        g1.include = vec!["g2".to_string(), "a".to_string()];
        let mut g2 = make_entry("g2", EntryKind::Group);
        g2.include = vec!["g1".to_string()];
        entry_repo
            .save_all(&[make_entry("a", EntryKind::Local), g1, g2])
            .await
            .unwrap();
        content_store.set("a", "# a").await.unwrap();

        let content = svc.resolve_content("g1").await.unwrap();
        assert_eq!(content, "# a");
    }

    #[tokio::test]
    async fn resolve_leaf_without_content_is_empty() {
        let (svc, entry_repo, _, _) = create_test_entry_service();
        entry_repo
            .save_all(&[make_entry("a", EntryKind::Local)])
            .await
            .unwrap();
        assert_eq!(svc.resolve_content("a").await.unwrap(), "");
    }

    #[tokio::test]
    async fn resolve_missing_entry_fails() {
        let (svc, _, _, _) = create_test_entry_service();
        let result = svc.resolve_content("ghost").await;
        assert!(matches!(result, Err(CoreError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn save_propagates_storage_errors() {
        let (svc, entry_repo, _, _) = create_test_entry_service();
        entry_repo.set_save_error(Some("disk full".to_string())).await;

        let result = svc.save_entry(save_request(EntryKind::Local, "x")).await;
        assert!(matches!(result, Err(CoreError::StorageError(_))));
    }
}
