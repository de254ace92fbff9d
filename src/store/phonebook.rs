//! Phonebook rows.
use std::fmt;
use super::{SortKey, SortOrder, StoreEntry};

/// One phonebook row: a name and a number, in a numbered slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhonebookEntry {
    pub index: Option<u32>,
    pub text: String,
    pub telephone: String
}
impl PhonebookEntry {
    pub fn new<T: Into<String>, U: Into<String>>(text: T, telephone: U) -> Self {
        PhonebookEntry { index: None, text: text.into(), telephone: telephone.into() }
    }
    pub fn at(index: u32, text: &str, telephone: &str) -> Self {
        PhonebookEntry { index: Some(index), text: text.into(), telephone: telephone.into() }
    }
}
impl fmt::Display for PhonebookEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(i) = self.index {
            write!(f, "#{} ", i)?;
        }
        write!(f, "'{}' tel# {}", self.text, self.telephone)
    }
}
impl StoreEntry for PhonebookEntry {
    fn index(&self) -> Option<u32> {
        self.index
    }
    fn set_index(&mut self, index: Option<u32>) {
        self.index = index;
    }
    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.telephone.is_empty()
    }
    fn supports_order(order: SortOrder) -> bool {
        order != SortOrder::ByDate
    }
    fn sort_key(&self, order: SortOrder) -> Option<SortKey> {
        match order {
            SortOrder::ByIndex => Some(SortKey::Index(self.index.unwrap_or(0))),
            SortOrder::ByText => Some(SortKey::text(&self.text)),
            SortOrder::ByTelephone => Some(SortKey::Telephone(self.telephone.clone())),
            SortOrder::ByDate => None
        }
    }
    fn content_eq(&self, other: &Self) -> bool {
        self.text == other.text && self.telephone == other.telephone
    }
    fn text(&self) -> String {
        self.text.clone()
    }
    fn telephone(&self) -> String {
        self.telephone.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_ignores_index() {
        let a = PhonebookEntry::at(1, "Alice", "111");
        let b = PhonebookEntry::at(7, "Alice", "111");
        assert!(a.content_eq(&b));
        assert!(a != b);
        assert!(!a.content_eq(&PhonebookEntry::new("alice", "111")));
    }
    #[test]
    fn keys() {
        let e = PhonebookEntry::at(3, "Alice", "111");
        assert_eq!(e.sort_key(SortOrder::ByText), Some(SortKey::Text("alice".into())));
        assert_eq!(e.sort_key(SortOrder::ByIndex), Some(SortKey::Index(3)));
        assert_eq!(e.sort_key(SortOrder::ByDate), None);
        assert!(PhonebookEntry::default().is_empty());
        assert_eq!(e.to_string(), "#3 'Alice' tel# 111");
    }
}
