//! Keeping two stores consistent: copying, synchronizing, backing up, adding and deleting
//! entries.
//!
//! Synchronization runs three passes against the destination, strictly in this order: update
//! entries in place where that's enough, delete entries the source no longer has, then insert
//! entries the destination is missing. Which entries count as "the same" depends on the
//! `ReconciliationPolicy`: slot indices (`IndexedPolicy`), or text (`ContentPolicy`). Within a
//! key, entries are compared on their full content, since keys needn't be unique.
//!
//! Every operation works out its changes on a scratch copy of the destination first, so that
//! capacity problems are reported before the destination is touched (and so that a dry run is
//! just the first half of a real run).
use std::collections::BTreeSet;
use std::fmt;
use crate::errors::*;
use crate::store::{SlotId, SortKey, SortOrder, SortedStore, StoreEntry};

/// How to run an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Identify entries by their slot index rather than by their content, and keep source
    /// indices when inserting.
    pub indexed: bool,
    /// Work out what would change, but don't change it.
    pub dry_run: bool
}
/// One change made to a destination store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<E> {
    Inserted(E),
    Updated { old: E, new: E },
    Deleted(E)
}
impl<E: StoreEntry> fmt::Display for Change<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Change::Inserted(ref e) => write!(f, "inserted {}", e),
            Change::Updated { ref old, ref new } => write!(f, "updated {} to {}", old, new),
            Change::Deleted(ref e) => write!(f, "deleted {}", e)
        }
    }
}
/// Everything an operation changed (or would have changed, for a dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport<E> {
    pub changes: Vec<Change<E>>,
    pub dry_run: bool
}
impl<E> SyncReport<E> {
    fn new(dry_run: bool) -> Self {
        SyncReport { changes: vec![], dry_run }
    }
    pub fn inserted(&self) -> usize {
        self.changes.iter().filter(|c| matches!(c, Change::Inserted(_))).count()
    }
    pub fn updated(&self) -> usize {
        self.changes.iter().filter(|c| matches!(c, Change::Updated { .. })).count()
    }
    pub fn deleted(&self) -> usize {
        self.changes.iter().filter(|c| matches!(c, Change::Deleted(_))).count()
    }
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn index_suffix<E: StoreEntry>(e: &E, indexed: bool) -> String {
    match e.index() {
        Some(i) if indexed => format!(" (index #{})", i),
        _ => String::new()
    }
}
fn key_of<E: StoreEntry>(e: &E, order: SortOrder) -> GsmResult<SortKey> {
    e.sort_key(order)
        .ok_or(GsmError::parameter(format!("entry can't be sorted {:?}", order)))
}
/// Whether `store` has an entry with the same content as `entry` under `key`.
fn present<E: StoreEntry>(store: &SortedStore<E>, key: &SortKey, entry: &E) -> GsmResult<bool> {
    Ok(store.equal_range(key)?
        .into_iter()
        .filter_map(|s| store.get(s))
        .any(|e| e.content_eq(entry)))
}
fn insert<E: StoreEntry>(dest: &mut SortedStore<E>, entry: &E, indexed: bool, report: &mut SyncReport<E>) -> GsmResult<()> {
    info!("inserting '{}' tel# {}{}", entry.text(), entry.telephone(), index_suffix(entry, indexed));
    let mut entry = entry.clone();
    if !indexed {
        entry.set_index(None);
    }
    let slot = dest.insert(entry)?;
    if let Some(e) = dest.get(slot) {
        report.changes.push(Change::Inserted(e.clone()));
    }
    Ok(())
}
fn updated<E: StoreEntry>(dest: &SortedStore<E>, slot: SlotId, old: E, report: &mut SyncReport<E>) {
    if let Some(new) = dest.get(slot) {
        report.changes.push(Change::Updated { old, new: new.clone() });
    }
}

/// How entries in the source and destination are matched up for synchronization.
pub trait ReconciliationPolicy<E: StoreEntry> {
    /// The order both stores are sorted in while synchronizing.
    fn order(&self) -> SortOrder;
    /// Whether inserted entries keep their source index.
    fn indexed(&self) -> bool;
    /// The update pass: overwrite destination entries in place where the policy says an entry
    /// has merely changed.
    fn update_entries(&self, source: &SortedStore<E>, dest: &mut SortedStore<E>, report: &mut SyncReport<E>) -> GsmResult<()>;
}
/// Entries are the same entry if they're in the same slot.
#[derive(Debug, Copy, Clone, Default)]
pub struct IndexedPolicy;
impl<E: StoreEntry> ReconciliationPolicy<E> for IndexedPolicy {
    fn order(&self) -> SortOrder {
        SortOrder::ByIndex
    }
    fn indexed(&self) -> bool {
        true
    }
    fn update_entries(&self, source: &SortedStore<E>, dest: &mut SortedStore<E>, report: &mut SyncReport<E>) -> GsmResult<()> {
        for entry in source.iter() {
            let key = key_of(entry, SortOrder::ByIndex)?;
            let slot = match dest.find(&key)? {
                Some(s) => s,
                None => continue
            };
            let differs = dest.get(slot).map(|d| !d.content_eq(entry)).unwrap_or(false);
            if differs {
                let old = dest.replace(slot, entry.clone())?;
                info!("updating '{}' tel# {} to new tel# {}{}", old.text(), old.telephone(), entry.telephone(), index_suffix(entry, true));
                updated(dest, slot, old, report);
            }
        }
        Ok(())
    }
}
/// Entries are the same entry if they have the same text.
#[derive(Debug, Copy, Clone, Default)]
pub struct ContentPolicy;
impl<E: StoreEntry> ReconciliationPolicy<E> for ContentPolicy {
    fn order(&self) -> SortOrder {
        SortOrder::ByText
    }
    fn indexed(&self) -> bool {
        false
    }
    /// For every text in the source that matches exactly one destination entry, make that entry
    /// equal to (the first) source entry with that text, unless it already equals one of them.
    /// Texts matching several destination entries are left alone.
    fn update_entries(&self, source: &SortedStore<E>, dest: &mut SortedStore<E>, report: &mut SyncReport<E>) -> GsmResult<()> {
        let mut last_key = None;
        for entry in source.iter() {
            let key = key_of(entry, SortOrder::ByText)?;
            if last_key.as_ref() == Some(&key) {
                continue;
            }
            last_key = Some(key.clone());
            let range = dest.equal_range(&key)?;
            if range.len() != 1 {
                if range.len() > 1 {
                    debug!("not updating '{}': {} entries with that text in destination", entry.text(), range.len());
                }
                continue;
            }
            let slot = range[0];
            let target = match dest.get(slot) {
                Some(d) => d.clone(),
                None => continue
            };
            if present(source, &key, &target)? {
                continue;
            }
            let old = dest.replace(slot, entry.clone())?;
            info!("updating '{}' tel# {} to new tel# {}", old.text(), old.telephone(), entry.telephone());
            updated(dest, slot, old, report);
        }
        Ok(())
    }
}

fn delete_not_present<E: StoreEntry>(source: &SortedStore<E>, dest: &mut SortedStore<E>, order: SortOrder, indexed: bool, report: &mut SyncReport<E>) -> GsmResult<()> {
    // erased slots just drop out of the snapshot
    for slot in dest.slot_ids() {
        let found = match dest.get(slot) {
            Some(e) => present(source, &key_of(e, order)?, e)?,
            None => continue
        };
        if !found {
            if let Some(e) = dest.erase(slot) {
                info!("deleting '{}' tel# {}{}", e.text(), e.telephone(), index_suffix(&e, indexed));
                report.changes.push(Change::Deleted(e));
            }
        }
    }
    Ok(())
}
fn insert_not_present<E: StoreEntry>(source: &SortedStore<E>, dest: &mut SortedStore<E>, order: SortOrder, indexed: bool, report: &mut SyncReport<E>) -> GsmResult<()> {
    for entry in source.iter() {
        if !present(dest, &key_of(entry, order)?, entry)? {
            insert(dest, entry, indexed, report)?;
        }
    }
    Ok(())
}
fn run_synchronize<E: StoreEntry>(policy: &dyn ReconciliationPolicy<E>, source: &SortedStore<E>, dest: &mut SortedStore<E>, dry_run: bool) -> GsmResult<SyncReport<E>> {
    let mut report = SyncReport::new(dry_run);
    let order = policy.order();
    policy.update_entries(source, dest, &mut report)?;
    delete_not_present(source, dest, order, policy.indexed(), &mut report)?;
    insert_not_present(source, dest, order, policy.indexed(), &mut report)?;
    Ok(report)
}
/// Check everything `report` would write fits into `dest`, given it ends up with `final_len`
/// entries.
fn check_capacity<E: StoreEntry>(dest: &SortedStore<E>, report: &SyncReport<E>, final_len: usize) -> GsmResult<()> {
    let limits = dest.capacity_limits();
    for change in report.changes.iter() {
        match *change {
            Change::Inserted(ref e) | Change::Updated { new: ref e, .. } => limits.check_entry(e)?,
            Change::Deleted(_) => {}
        }
    }
    limits.check_count(final_len)
}
/// Look up each of `indices` in `source`, failing before anything else happens if any are
/// missing. An index given more than once selects its entry once.
fn select<E: StoreEntry>(source: &mut SortedStore<E>, indices: &[u32]) -> GsmResult<Vec<E>> {
    source.set_sort_order(SortOrder::ByIndex)?;
    let mut ret = vec![];
    let mut missing = vec![];
    let mut seen = BTreeSet::new();
    for &i in indices {
        if !seen.insert(i) {
            debug!("index '{}' selected more than once", i);
            continue;
        }
        match source.find(&SortKey::Index(i))?.and_then(|s| source.get(s)) {
            Some(e) => ret.push(e.clone()),
            None => missing.push(i)
        }
    }
    if !missing.is_empty() {
        Err(GsmError::MissingIndices("source", IndexList(missing)))?
    }
    Ok(ret)
}
fn finish<E: StoreEntry>(dest: &mut SortedStore<E>, report: &SyncReport<E>) -> GsmResult<()> {
    if !report.dry_run {
        dest.sync()?;
    }
    Ok(())
}

/// Describe every entry of `source`, in its current order.
pub fn list<E: StoreEntry>(source: &SortedStore<E>) -> Vec<String> {
    source.iter().map(|e| e.to_string()).collect()
}
/// Bring `dest` in line with `source`, changing as little as possible.
pub fn synchronize<E: StoreEntry + 'static>(source: &mut SortedStore<E>, dest: &mut SortedStore<E>, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    let policy: &dyn ReconciliationPolicy<E> = if opts.indexed {
        &IndexedPolicy
    }
    else {
        &ContentPolicy
    };
    source.set_sort_order(policy.order())?;
    dest.set_sort_order(policy.order())?;
    let mut scratch = dest.detached_copy()?;
    let plan = run_synchronize(policy, source, &mut scratch, opts.dry_run)?;
    check_capacity(dest, &plan, scratch.len())?;
    if opts.dry_run {
        return Ok(plan);
    }
    let report = run_synchronize(policy, source, dest, false)?;
    info!("synchronized: {} updated, {} deleted, {} inserted", report.updated(), report.deleted(), report.inserted());
    finish(dest, &report)?;
    Ok(report)
}
fn copy_entries<E: StoreEntry + 'static>(entries: Vec<E>, dest: &mut SortedStore<E>, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    let mut report = SyncReport::new(opts.dry_run);
    // fill an empty scratch store first, so length limits and index clashes show up before
    // `dest` is cleared
    let mut scratch = dest.detached_copy()?;
    scratch.clear();
    let mut plan = SyncReport::new(true);
    for e in entries.iter() {
        insert(&mut scratch, e, opts.indexed, &mut plan)?;
    }
    dest.capacity_limits().check_count(entries.len())?;
    if opts.dry_run {
        report.changes = dest.iter().cloned().map(Change::Deleted)
            .chain(entries.into_iter().map(Change::Inserted))
            .collect();
        return Ok(report);
    }
    for e in dest.iter() {
        report.changes.push(Change::Deleted(e.clone()));
    }
    dest.clear();
    for e in entries.iter() {
        insert(dest, e, opts.indexed, &mut report)?;
    }
    finish(dest, &report)?;
    Ok(report)
}
/// Replace the contents of `dest` with those of `source`.
pub fn copy<E: StoreEntry + 'static>(source: &SortedStore<E>, dest: &mut SortedStore<E>, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    copy_entries(source.iter().cloned().collect(), dest, opts)
}
/// Replace the contents of `dest` with the entries of `source` at `indices`.
pub fn copy_selected<E: StoreEntry + 'static>(source: &mut SortedStore<E>, dest: &mut SortedStore<E>, indices: &[u32], opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    let entries = select(source, indices)?;
    copy_entries(entries, dest, opts)
}
/// Add one new entry to `dest`.
pub fn add<E: StoreEntry>(dest: &mut SortedStore<E>, entry: E, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    let mut report = SyncReport::new(opts.dry_run);
    let limits = dest.capacity_limits();
    limits.check_entry(&entry)?;
    limits.check_count(dest.len() + 1)?;
    if opts.dry_run {
        report.changes.push(Change::Inserted(entry));
        return Ok(report);
    }
    insert(dest, &entry, opts.indexed, &mut report)?;
    finish(dest, &report)?;
    Ok(report)
}
/// Delete the entries at `indices` from `dest`.
///
/// Every index is handled on its own: missing ones don't stop the rest from being deleted, but
/// are all named in the error returned at the end.
pub fn delete<E: StoreEntry>(dest: &mut SortedStore<E>, indices: &[u32], opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    dest.set_sort_order(SortOrder::ByIndex)?;
    let mut report = SyncReport::new(opts.dry_run);
    let mut missing = vec![];
    for &i in indices {
        let range = dest.equal_range(&SortKey::Index(i))?;
        if range.is_empty() {
            warn!("no index '{}' in destination", i);
            missing.push(i);
            continue;
        }
        for slot in range {
            let e = if opts.dry_run {
                dest.get(slot).cloned()
            }
            else {
                dest.erase(slot)
            };
            if let Some(e) = e {
                info!("deleting entry #{} from destination: {}", i, e);
                report.changes.push(Change::Deleted(e));
            }
        }
    }
    finish(dest, &report)?;
    if !missing.is_empty() {
        Err(GsmError::MissingIndices("destination", IndexList(missing)))?
    }
    Ok(report)
}
fn backup_entries<E: StoreEntry + 'static>(entries: Vec<E>, dest: &mut SortedStore<E>, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    dest.set_sort_order(SortOrder::ByDate)?;
    let run = |dest: &mut SortedStore<E>, dry_run| -> GsmResult<SyncReport<E>> {
        let mut report = SyncReport::new(dry_run);
        for e in entries.iter() {
            if !present(dest, &key_of(e, SortOrder::ByDate)?, e)? {
                insert(dest, e, false, &mut report)?;
            }
        }
        Ok(report)
    };
    let mut scratch = dest.detached_copy()?;
    let plan = run(&mut scratch, opts.dry_run)?;
    check_capacity(dest, &plan, scratch.len())?;
    if opts.dry_run {
        return Ok(plan);
    }
    let report = run(dest, false)?;
    finish(dest, &report)?;
    Ok(report)
}
/// Add every entry of `source` that `dest` doesn't already have (same date and content) to
/// `dest`. Never deletes or overwrites anything.
pub fn backup<E: StoreEntry + 'static>(source: &SortedStore<E>, dest: &mut SortedStore<E>, opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    backup_entries(source.iter().cloned().collect(), dest, opts)
}
/// Like `backup`, but only for the entries of `source` at `indices`.
pub fn backup_selected<E: StoreEntry + 'static>(source: &mut SortedStore<E>, dest: &mut SortedStore<E>, indices: &[u32], opts: SyncOptions) -> GsmResult<SyncReport<E>> {
    let entries = select(source, indices)?;
    backup_entries(entries, dest, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PhonebookEntry;

    fn store(entries: &[(&str, &str)]) -> SortedStore<PhonebookEntry> {
        let entries = entries.iter()
            .map(|&(t, n)| PhonebookEntry::new(t, n))
            .collect();
        SortedStore::from_entries(entries, SortOrder::ByIndex).unwrap()
    }
    fn contents(s: &SortedStore<PhonebookEntry>) -> Vec<(String, String)> {
        let mut ret = s.iter()
            .map(|e| (e.text.clone(), e.telephone.clone()))
            .collect::<Vec<_>>();
        ret.sort();
        ret
    }

    #[test]
    fn update_in_place() {
        let mut src = store(&[("Alice", "111")]);
        let mut dst = store(&[("Alice", "222")]);
        let report = synchronize(&mut src, &mut dst, SyncOptions::default()).unwrap();
        assert_eq!((report.updated(), report.inserted(), report.deleted()), (1, 0, 0));
        assert_eq!(contents(&dst), vec![("Alice".into(), "111".into())]);
    }
    #[test]
    fn ambiguous_text_is_not_updated() {
        let mut src = store(&[("Bob", "3")]);
        let mut dst = store(&[("Bob", "1"), ("Bob", "2")]);
        let report = synchronize(&mut src, &mut dst, SyncOptions::default()).unwrap();
        assert_eq!((report.updated(), report.inserted(), report.deleted()), (0, 1, 2));
        assert_eq!(contents(&dst), vec![("Bob".into(), "3".into())]);
    }
    #[test]
    fn duplicate_source_text_keeps_matching_entry() {
        let mut src = store(&[("Bob", "2"), ("Bob", "1")]);
        let mut dst = store(&[("Bob", "1")]);
        let report = synchronize(&mut src, &mut dst, SyncOptions::default()).unwrap();
        assert_eq!((report.updated(), report.inserted(), report.deleted()), (0, 1, 0));
    }
    #[test]
    fn dry_run_changes_nothing() {
        let mut src = store(&[("Alice", "111"), ("Carol", "333")]);
        let mut dst = store(&[("Alice", "222"), ("Dave", "444")]);
        let before = contents(&dst);
        let opts = SyncOptions { dry_run: true, ..Default::default() };
        let report = synchronize(&mut src, &mut dst, opts).unwrap();
        assert!(report.dry_run);
        assert_eq!((report.updated(), report.inserted(), report.deleted()), (1, 1, 1));
        assert_eq!(contents(&dst), before);
        assert!(!dst.is_changed());
    }
    #[test]
    fn indexed_sync() {
        let mut src = SortedStore::from_entries(vec![
            PhonebookEntry::at(1, "a", "1"),
            PhonebookEntry::at(2, "b", "2"),
            PhonebookEntry::at(4, "d", "4")
        ], SortOrder::ByIndex).unwrap();
        let mut dst = SortedStore::from_entries(vec![
            PhonebookEntry::at(1, "a", "1"),
            PhonebookEntry::at(2, "b", "9"),
            PhonebookEntry::at(3, "c", "3")
        ], SortOrder::ByIndex).unwrap();
        let opts = SyncOptions { indexed: true, ..Default::default() };
        let report = synchronize(&mut src, &mut dst, opts).unwrap();
        assert_eq!((report.updated(), report.inserted(), report.deleted()), (1, 1, 1));
        let got = dst.iter().cloned().collect::<Vec<_>>();
        assert_eq!(got, src.iter().cloned().collect::<Vec<_>>());
        assert!(synchronize(&mut src, &mut dst, opts).unwrap().is_empty());
    }
    #[test]
    fn capacity_checked_before_mutation() {
        use crate::store::{CapacityLimits, MemoryBackend};
        let limits = CapacityLimits { max_text_len: None, max_telephone_len: None, max_entries: Some(2) };
        let backend = MemoryBackend::with_limits(vec![PhonebookEntry::new("x", "0")], limits);
        let mut dst = SortedStore::open(Box::new(backend), SortOrder::ByIndex).unwrap();
        let mut src = store(&[("x", "0"), ("y", "1"), ("z", "2")]);
        match synchronize(&mut src, &mut dst, SyncOptions::default()) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Parameter),
            Ok(r) => panic!("synchronized past capacity: {:?}", r)
        }
        assert_eq!(dst.len(), 1);
        assert!(!dst.is_changed());
        assert!(copy(&src, &mut dst, SyncOptions::default()).is_err());
        assert_eq!(dst.len(), 1);
    }
    #[test]
    fn copy_and_list() {
        let src = SortedStore::from_entries(vec![
            PhonebookEntry::at(5, "e", "5"),
            PhonebookEntry::at(7, "g", "7")
        ], SortOrder::ByIndex).unwrap();
        let mut dst = store(&[("old", "0")]);
        let report = copy(&src, &mut dst, SyncOptions::default()).unwrap();
        assert_eq!((report.inserted(), report.deleted()), (2, 1));
        assert_eq!(list(&dst), vec!["#1 'e' tel# 5", "#2 'g' tel# 7"]);
        let report = copy(&src, &mut dst, SyncOptions { indexed: true, ..Default::default() }).unwrap();
        assert_eq!(report.inserted(), 2);
        assert_eq!(list(&dst), vec!["#5 'e' tel# 5", "#7 'g' tel# 7"]);
    }
    #[test]
    fn copy_selected_checks_indices_first() {
        let mut src = store(&[("a", "1"), ("b", "2")]);
        let mut dst = store(&[("keep", "0")]);
        match copy_selected(&mut src, &mut dst, &[1, 8], SyncOptions::default()) {
            Err(e) => assert_eq!(e.to_string(), "no index '8' in source"),
            Ok(_) => panic!("copied with a missing index")
        }
        assert_eq!(contents(&dst), vec![("keep".into(), "0".into())]);
        copy_selected(&mut src, &mut dst, &[2], SyncOptions::default()).unwrap();
        assert_eq!(contents(&dst), vec![("b".into(), "2".into())]);
    }
    #[test]
    fn repeated_indices_are_copied_once() {
        let mut src = store(&[("a", "1"), ("b", "2")]);
        let mut dst = SortedStore::from_entries(vec![PhonebookEntry::at(5, "keep", "0")], SortOrder::ByIndex).unwrap();
        let opts = SyncOptions { indexed: true, ..Default::default() };
        let report = copy_selected(&mut src, &mut dst, &[1, 1], opts).unwrap();
        assert_eq!((report.inserted(), report.deleted()), (1, 1));
        assert_eq!(list(&dst), vec!["#1 'a' tel# 1"]);
    }
    #[test]
    fn index_clash_fails_before_clearing() {
        let mut dst = SortedStore::from_entries(vec![PhonebookEntry::at(5, "keep", "0")], SortOrder::ByIndex).unwrap();
        let entries = vec![PhonebookEntry::at(1, "a", "1"), PhonebookEntry::at(1, "b", "2")];
        let opts = SyncOptions { indexed: true, ..Default::default() };
        match copy_entries(entries, &mut dst, opts) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Parameter),
            Ok(r) => panic!("copied clashing indices: {:?}", r)
        }
        assert_eq!(list(&dst), vec!["#5 'keep' tel# 0"]);
        assert!(!dst.is_changed());
    }
    #[test]
    fn add_entry() {
        let mut dst = store(&[("a", "1")]);
        let report = add(&mut dst, PhonebookEntry::new("b", "2"), SyncOptions::default()).unwrap();
        assert_eq!(report.inserted(), 1);
        assert_eq!(dst.len(), 2);
    }
}
