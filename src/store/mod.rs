//! Ordered stores of phonebook rows or stored SMS messages.
//!
//! A `SortedStore` keeps its entries in a slot arena: every entry lives in a slot whose
//! `SlotId` never changes while the entry is stored, and the active sort order is an index of
//! `(SortKey, SlotId)` pairs on top of that. Re-keying for a new order only rebuilds the index;
//! erasing an entry frees its slot without disturbing any other slot id, so a traversal over a
//! snapshot of slot ids stays valid while entries are erased (erased slots are just skipped).
use std::collections::BTreeSet;
use std::fmt;
use crate::errors::*;
use crate::pdu::Timestamp;

pub mod phonebook;
pub mod sms_store;

pub use self::phonebook::PhonebookEntry;
pub use self::sms_store::{MessageStatus, SmsStoreEntry};

/// The orders a store can be sorted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SortOrder {
    ByIndex,
    /// By text, case-insensitively.
    ByText,
    ByTelephone,
    ByDate
}
/// The key an entry sorts under, for one particular `SortOrder`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    Index(u32),
    /// Lowercased text.
    Text(String),
    Telephone(String),
    /// Entries without a date sort first.
    Date(Option<Timestamp>)
}
impl SortKey {
    /// A text key; use this rather than `SortKey::Text` so case is folded the same way the store
    /// folds it.
    pub fn text(s: &str) -> Self {
        SortKey::Text(s.to_lowercase())
    }
    pub fn order(&self) -> SortOrder {
        match *self {
            SortKey::Index(_) => SortOrder::ByIndex,
            SortKey::Text(_) => SortOrder::ByText,
            SortKey::Telephone(_) => SortOrder::ByTelephone,
            SortKey::Date(_) => SortOrder::ByDate
        }
    }
}
/// Something that can be kept in a `SortedStore`.
pub trait StoreEntry: Clone + fmt::Debug + fmt::Display {
    /// Slot number on the device or in the file, if assigned.
    fn index(&self) -> Option<u32>;
    fn set_index(&mut self, index: Option<u32>);
    /// Whether this is an empty slot rather than an actual entry.
    fn is_empty(&self) -> bool;
    fn supports_order(order: SortOrder) -> bool where Self: Sized;
    /// The key for `order`, or `None` if this kind of entry can't be sorted that way.
    fn sort_key(&self, order: SortOrder) -> Option<SortKey>;
    /// Equality of everything except the index.
    fn content_eq(&self, other: &Self) -> bool;
    fn text(&self) -> String;
    fn telephone(&self) -> String;
}

/// What a store's backing medium can hold. `None` means no limit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CapacityLimits {
    pub max_text_len: Option<usize>,
    pub max_telephone_len: Option<usize>,
    pub max_entries: Option<usize>
}
impl CapacityLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }
    /// Check that `entry` fits, length-wise.
    pub fn check_entry<E: StoreEntry>(&self, entry: &E) -> GsmResult<()> {
        if let Some(max) = self.max_text_len {
            let text = entry.text();
            if text.chars().count() > max {
                Err(GsmError::parameter(format!("text '{}' is too large to fit into destination (maximum size {} characters)", text, max)))?
            }
        }
        if let Some(max) = self.max_telephone_len {
            let tel = entry.telephone();
            if tel.chars().count() > max {
                Err(GsmError::parameter(format!("phone number '{}' is too large to fit into destination (maximum size {} characters)", tel, max)))?
            }
        }
        Ok(())
    }
    /// Check that `count` entries fit.
    pub fn check_count(&self, count: usize) -> GsmResult<()> {
        match self.max_entries {
            Some(max) if count > max => {
                Err(GsmError::parameter(format!("{} entries won't fit into destination (maximum {})", count, max)))
            },
            _ => Ok(())
        }
    }
}

/// The medium a store is loaded from and flushed to: a file, a device, or just memory.
pub trait StoreBackend<E: StoreEntry> {
    /// Read every slot, empty ones included.
    fn load(&mut self) -> GsmResult<Vec<E>>;
    /// Write the store's entries (in index order) back.
    fn sync(&mut self, entries: &[E]) -> GsmResult<()>;
    fn capacity_limits(&self) -> CapacityLimits;
}
/// A backend that keeps everything in a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend<E> {
    pub entries: Vec<E>,
    pub limits: CapacityLimits
}
impl<E> MemoryBackend<E> {
    pub fn new(entries: Vec<E>) -> Self {
        MemoryBackend { entries, limits: CapacityLimits::unlimited() }
    }
    pub fn with_limits(entries: Vec<E>, limits: CapacityLimits) -> Self {
        MemoryBackend { entries, limits }
    }
}
impl<E: StoreEntry> StoreBackend<E> for MemoryBackend<E> {
    fn load(&mut self) -> GsmResult<Vec<E>> {
        Ok(self.entries.clone())
    }
    fn sync(&mut self, entries: &[E]) -> GsmResult<()> {
        self.entries = entries.to_vec();
        Ok(())
    }
    fn capacity_limits(&self) -> CapacityLimits {
        self.limits
    }
}

/// Stable identifier of a slot in a `SortedStore`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

/// An ordered collection of entries, sorted by one `SortOrder` at a time, allowing duplicate
/// keys.
pub struct SortedStore<E: StoreEntry> {
    slots: Vec<Option<E>>,
    /// Freed slots, reused most recently freed first.
    free: Vec<SlotId>,
    keys: BTreeSet<(SortKey, SlotId)>,
    /// Indices of every stored entry.
    indices: BTreeSet<u32>,
    /// No index below this one is free.
    free_index_hint: u32,
    order: SortOrder,
    changed: bool,
    backend: Box<dyn StoreBackend<E>>
}
impl<E: StoreEntry> fmt::Debug for SortedStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SortedStore")
            .field("order", &self.order)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
impl<E: StoreEntry + 'static> SortedStore<E> {
    /// An empty store kept only in memory.
    pub fn new(order: SortOrder) -> GsmResult<Self> {
        Self::open(Box::new(MemoryBackend::new(vec![])), order)
    }
    /// An in-memory store holding `entries`.
    pub fn from_entries(entries: Vec<E>, order: SortOrder) -> GsmResult<Self> {
        Self::open(Box::new(MemoryBackend::new(entries)), order)
    }
    /// A scratch copy of this store's entries, in memory and without an entry count limit.
    pub fn detached_copy(&self) -> GsmResult<Self> {
        let limits = CapacityLimits {
            max_entries: None,
            ..self.capacity_limits()
        };
        let entries = self.iter().cloned().collect();
        Self::open(Box::new(MemoryBackend::with_limits(entries, limits)), self.order)
    }
}
impl<E: StoreEntry> SortedStore<E> {
    /// Load a store from `backend`, skipping empty slots.
    pub fn open(mut backend: Box<dyn StoreBackend<E>>, order: SortOrder) -> GsmResult<Self> {
        if !E::supports_order(order) {
            Err(GsmError::parameter(format!("this kind of store can't be sorted {:?}", order)))?
        }
        let loaded = backend.load()?;
        let mut ret = SortedStore {
            slots: vec![],
            free: vec![],
            keys: BTreeSet::new(),
            indices: BTreeSet::new(),
            free_index_hint: 1,
            order,
            changed: false,
            backend
        };
        let mut skipped = 0;
        for entry in loaded {
            if entry.is_empty() {
                skipped += 1;
                continue;
            }
            ret.put(entry)?;
        }
        debug!("loaded {} entries ({} empty slots skipped)", ret.len(), skipped);
        ret.changed = false;
        Ok(ret)
    }
    pub fn capacity_limits(&self) -> CapacityLimits {
        self.backend.capacity_limits()
    }
    pub fn sort_order(&self) -> SortOrder {
        self.order
    }
    pub fn len(&self) -> usize {
        self.keys.len()
    }
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
    /// Whether anything has changed since loading or the last `sync`.
    pub fn is_changed(&self) -> bool {
        self.changed
    }
    fn key_for(&self, entry: &E) -> GsmResult<SortKey> {
        entry.sort_key(self.order)
            .ok_or(GsmError::parameter(format!("entry can't be sorted {:?}", self.order)))
    }
    fn check_key(&self, key: &SortKey) -> GsmResult<()> {
        if key.order() != self.order {
            Err(GsmError::parameter(format!("can't look up a {:?} key in a store sorted {:?}", key.order(), self.order)))?
        }
        Ok(())
    }
    fn lowest_free_index(&mut self) -> u32 {
        while self.indices.contains(&self.free_index_hint) {
            self.free_index_hint += 1;
        }
        self.free_index_hint
    }
    /// Whether an entry holds `index`.
    pub fn has_index(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }
    /// Place an entry, assigning the lowest free index if it has none.
    fn put(&mut self, mut entry: E) -> GsmResult<SlotId> {
        let index = match entry.index() {
            Some(i) if self.indices.contains(&i) => {
                Err(GsmError::parameter(format!("index {} is already in use", i)))?
            },
            Some(i) => i,
            None => self.lowest_free_index()
        };
        entry.set_index(Some(index));
        let key = self.key_for(&entry)?;
        self.indices.insert(index);
        let slot = match self.free.pop() {
            Some(s) => {
                self.slots[s.0] = Some(entry);
                s
            },
            None => {
                self.slots.push(Some(entry));
                SlotId(self.slots.len() - 1)
            }
        };
        self.keys.insert((key, slot));
        self.changed = true;
        Ok(slot)
    }
    /// Insert an entry, after checking it fits.
    pub fn insert(&mut self, entry: E) -> GsmResult<SlotId> {
        if entry.is_empty() {
            Err(GsmError::parameter("can't insert an empty entry"))?
        }
        let limits = self.capacity_limits();
        limits.check_entry(&entry)?;
        limits.check_count(self.len() + 1)?;
        self.put(entry)
    }
    pub fn get(&self, slot: SlotId) -> Option<&E> {
        self.slots.get(slot.0).and_then(|s| s.as_ref())
    }
    /// Overwrite the entry in `slot`, keeping the slot's index. Returns the old entry.
    pub fn replace(&mut self, slot: SlotId, mut entry: E) -> GsmResult<E> {
        self.capacity_limits().check_entry(&entry)?;
        let new_key = self.key_for(&entry)?;
        let old = self.slots.get_mut(slot.0)
            .and_then(|s| s.take())
            .ok_or(GsmError::parameter(format!("no entry in slot {}", slot.0)))?;
        entry.set_index(old.index());
        let old_key = old.sort_key(self.order);
        if let Some(k) = old_key {
            self.keys.remove(&(k, slot));
        }
        self.slots[slot.0] = Some(entry);
        self.keys.insert((new_key, slot));
        self.changed = true;
        Ok(old)
    }
    /// Remove the entry in `slot`, if there is one.
    pub fn erase(&mut self, slot: SlotId) -> Option<E> {
        let old = self.slots.get_mut(slot.0).and_then(|s| s.take())?;
        if let Some(k) = old.sort_key(self.order) {
            self.keys.remove(&(k, slot));
        }
        if let Some(i) = old.index() {
            self.indices.remove(&i);
            self.free_index_hint = self.free_index_hint.min(i.max(1));
        }
        self.free.push(slot);
        self.changed = true;
        Some(old)
    }
    /// Remove every entry in `slots`. Returns how many were there to remove.
    pub fn erase_range(&mut self, slots: &[SlotId]) -> usize {
        slots.iter().filter(|&&s| self.erase(s).is_some()).count()
    }
    /// Remove every entry with `key`. Returns how many were removed.
    pub fn erase_key(&mut self, key: &SortKey) -> GsmResult<usize> {
        let range = self.equal_range(key)?;
        Ok(self.erase_range(&range))
    }
    /// The first entry with `key`.
    pub fn find(&self, key: &SortKey) -> GsmResult<Option<SlotId>> {
        Ok(self.equal_range(key)?.into_iter().next())
    }
    /// Every entry with `key`, in order.
    pub fn equal_range(&self, key: &SortKey) -> GsmResult<Vec<SlotId>> {
        self.check_key(key)?;
        let lo = (key.clone(), SlotId(0));
        let hi = (key.clone(), SlotId(usize::max_value()));
        Ok(self.keys.range(lo..=hi).map(|&(_, s)| s).collect())
    }
    /// Re-key the store for `order`. Entries stay in their slots.
    pub fn set_sort_order(&mut self, order: SortOrder) -> GsmResult<()> {
        if order == self.order {
            return Ok(());
        }
        if !E::supports_order(order) {
            Err(GsmError::parameter(format!("this kind of store can't be sorted {:?}", order)))?
        }
        let mut keys = BTreeSet::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(ref e) = *slot {
                let key = e.sort_key(order)
                    .ok_or(GsmError::parameter(format!("entry can't be sorted {:?}", order)))?;
                keys.insert((key, SlotId(i)));
            }
        }
        self.keys = keys;
        self.order = order;
        Ok(())
    }
    pub fn clear(&mut self) {
        if !self.keys.is_empty() {
            self.changed = true;
        }
        self.slots.clear();
        self.free.clear();
        self.keys.clear();
        self.indices.clear();
        self.free_index_hint = 1;
    }
    /// Slot ids of every entry, in order, as of now.
    pub fn slot_ids(&self) -> Vec<SlotId> {
        self.keys.iter().map(|&(_, s)| s).collect()
    }
    /// Entries in the active order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'a E> + 'a {
        self.keys.iter().filter_map(move |&(_, s)| self.get(s))
    }
    /// Flush to the backend, if anything changed.
    pub fn sync(&mut self) -> GsmResult<()> {
        if !self.changed {
            return Ok(());
        }
        let mut entries = self.iter().cloned().collect::<Vec<_>>();
        entries.sort_by_key(|e| e.index());
        self.backend.sync(&entries)?;
        debug!("synced {} entries", entries.len());
        self.changed = false;
        Ok(())
    }
    /// Give back the backend, e.g. to reload what was synced.
    pub fn into_backend(self) -> Box<dyn StoreBackend<E>> {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pb(index: Option<u32>, text: &str, tel: &str) -> PhonebookEntry {
        PhonebookEntry { index, text: text.into(), telephone: tel.into() }
    }
    fn texts(s: &SortedStore<PhonebookEntry>) -> Vec<String> {
        s.iter().map(|e| e.text.clone()).collect()
    }

    #[test]
    fn insert_assigns_lowest_free_index() {
        let mut s = SortedStore::new(SortOrder::ByIndex).unwrap();
        s.insert(pb(Some(2), "b", "2")).unwrap();
        let a = s.insert(pb(None, "a", "1")).unwrap();
        let c = s.insert(pb(None, "c", "3")).unwrap();
        assert_eq!(s.get(a).unwrap().index, Some(1));
        assert_eq!(s.get(c).unwrap().index, Some(3));
        assert!(s.insert(pb(Some(3), "d", "4")).is_err());
        assert_eq!(texts(&s), vec!["a", "b", "c"]);
    }
    #[test]
    fn erased_indices_are_reused() {
        let entries = (1..=500).map(|i| pb(Some(i), &format!("n{}", i), "1")).collect();
        let mut s = SortedStore::from_entries(entries, SortOrder::ByIndex).unwrap();
        assert!(s.has_index(500));
        let fresh = s.insert(pb(None, "x", "9")).unwrap();
        assert_eq!(s.get(fresh).unwrap().index, Some(501));
        s.erase_key(&SortKey::Index(7)).unwrap();
        s.erase_key(&SortKey::Index(3)).unwrap();
        assert!(!s.has_index(3));
        let a = s.insert(pb(None, "a", "1")).unwrap();
        let b = s.insert(pb(None, "b", "2")).unwrap();
        let c = s.insert(pb(None, "c", "3")).unwrap();
        assert_eq!(s.get(a).unwrap().index, Some(3));
        assert_eq!(s.get(b).unwrap().index, Some(7));
        assert_eq!(s.get(c).unwrap().index, Some(502));
        assert!(s.insert(pb(Some(7), "d", "4")).is_err());
        s.clear();
        let d = s.insert(pb(None, "d", "4")).unwrap();
        assert_eq!(s.get(d).unwrap().index, Some(1));
    }
    #[test]
    fn duplicate_keys_and_equal_range() {
        let mut s = SortedStore::new(SortOrder::ByText).unwrap();
        s.insert(pb(None, "Bob", "1")).unwrap();
        s.insert(pb(None, "alice", "2")).unwrap();
        s.insert(pb(None, "bob", "3")).unwrap();
        let range = s.equal_range(&SortKey::text("BOB")).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(s.get(range[0]).unwrap().telephone, "1");
        assert!(s.equal_range(&SortKey::text("carol")).unwrap().is_empty());
        assert!(s.find(&SortKey::Index(1)).is_err());
    }
    #[test]
    fn resort_keeps_slots() {
        let mut s = SortedStore::new(SortOrder::ByText).unwrap();
        let z = s.insert(pb(None, "zed", "1")).unwrap();
        s.insert(pb(None, "amy", "9")).unwrap();
        assert_eq!(texts(&s), vec!["amy", "zed"]);
        s.set_sort_order(SortOrder::ByTelephone).unwrap();
        assert_eq!(texts(&s), vec!["zed", "amy"]);
        assert_eq!(s.get(z).unwrap().text, "zed");
        assert_eq!(s.len(), 2);
        assert!(s.set_sort_order(SortOrder::ByDate).is_err());
    }
    #[test]
    fn erase_during_scan() {
        let mut s = SortedStore::new(SortOrder::ByText).unwrap();
        for t in &["a", "b", "c", "d"] {
            s.insert(pb(None, t, "0")).unwrap();
        }
        let mut seen = vec![];
        for slot in s.slot_ids() {
            let text = match s.get(slot) {
                Some(e) => e.text.clone(),
                None => continue
            };
            seen.push(text.clone());
            if text == "b" || text == "c" {
                s.erase(slot);
            }
        }
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
        assert_eq!(texts(&s), vec!["a", "d"]);
        // freed slots get reused
        let e = s.insert(pb(None, "e", "0")).unwrap();
        assert!(e.0 < 4);
    }
    #[test]
    fn replace_rekeys() {
        let mut s = SortedStore::new(SortOrder::ByText).unwrap();
        let slot = s.insert(pb(Some(5), "old", "1")).unwrap();
        s.insert(pb(None, "middle", "2")).unwrap();
        let old = s.replace(slot, pb(None, "aaa", "3")).unwrap();
        assert_eq!(old.text, "old");
        assert_eq!(texts(&s), vec!["aaa", "middle"]);
        assert_eq!(s.get(slot).unwrap().index, Some(5));
    }
    #[test]
    fn capacity_is_checked_before_insert() {
        let limits = CapacityLimits { max_text_len: Some(4), max_telephone_len: None, max_entries: Some(1) };
        let backend = MemoryBackend::with_limits(vec![], limits);
        let mut s = SortedStore::open(Box::new(backend), SortOrder::ByIndex).unwrap();
        match s.insert(pb(None, "too long", "1")) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Parameter),
            Ok(_) => panic!("inserted an oversized entry")
        }
        s.insert(pb(None, "ok", "1")).unwrap();
        assert!(s.insert(pb(None, "no", "2")).is_err());
        assert_eq!(s.len(), 1);
    }
    #[test]
    fn load_skips_empty_and_sync_writes_back() {
        let backend = MemoryBackend::new(vec![pb(Some(1), "", ""), pb(Some(2), "x", "1")]);
        let mut s = SortedStore::open(Box::new(backend), SortOrder::ByIndex).unwrap();
        assert_eq!(s.len(), 1);
        assert!(!s.is_changed());
        s.insert(pb(None, "y", "2")).unwrap();
        s.sync().unwrap();
        let mut backend = s.into_backend();
        let saved = backend.load().unwrap();
        assert_eq!(saved.iter().map(|e| e.index).collect::<Vec<_>>(), vec![Some(1), Some(2)]);
        assert_eq!(saved[0].text, "y");
    }
}
