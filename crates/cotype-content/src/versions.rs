//! Version listing of a content record.
//!
//! The `published` flag of an entry is not stored with the revision. It is
//! computed from the record's published pointer whenever the list is iterated.

use serde::{Serialize, Serializer};

use cotype_types::persistence_adapter::VersionItem;

use crate::prelude::*;

/// A revision annotated with whether it is the published one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry<'a> {
	#[serde(flatten)]
	pub item: &'a VersionItem,
	pub published: bool,
}

/// Revisions of one record, most recent first
#[derive(Debug, Clone)]
pub struct VersionList {
	items: Vec<VersionItem>,
	published: Option<Rev>,
}

impl VersionList {
	pub fn new(mut items: Vec<VersionItem>, published: Option<Rev>) -> Self {
		// revs are unique within a record, so this order is total
		items.sort_unstable_by(|a, b| b.rev.cmp(&a.rev));
		Self { items, published }
	}

	/// Lazily annotated entries. Every call starts over from the newest revision.
	pub fn iter(&self) -> impl Iterator<Item = VersionEntry<'_>> + '_ {
		self.items
			.iter()
			.map(|item| VersionEntry { item, published: self.published == Some(item.rev) })
	}

	pub fn published(&self) -> Option<Rev> {
		self.published
	}

	pub fn contains(&self, rev: Rev) -> bool {
		self.items.iter().any(|item| item.rev == rev)
	}

	pub fn latest(&self) -> Option<&VersionItem> {
		self.items.first()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl Serialize for VersionList {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_seq(self.iter())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn item(rev: i64, date: i64) -> VersionItem {
		VersionItem { rev: Rev(rev), date: Timestamp(date), author_name: "Editor".into() }
	}

	#[test]
	fn test_ordered_by_rev_descending() {
		// equal dates do not matter, rev decides
		let list = VersionList::new(vec![item(1, 100), item(3, 100), item(2, 100)], None);
		let revs: Vec<i64> = list.iter().map(|e| e.item.rev.0).collect();
		assert_eq!(revs, vec![3, 2, 1]);
		assert_eq!(list.latest().map(|i| i.rev), Some(Rev(3)));
	}

	#[test]
	fn test_only_pointer_rev_is_published() {
		let list = VersionList::new(vec![item(1, 1), item(2, 2), item(3, 3)], Some(Rev(2)));
		let flags: Vec<(i64, bool)> = list.iter().map(|e| (e.item.rev.0, e.published)).collect();
		assert_eq!(flags, vec![(3, false), (2, true), (1, false)]);
	}

	#[test]
	fn test_iteration_is_restartable() {
		let list = VersionList::new(vec![item(1, 1), item(2, 2)], Some(Rev(1)));
		let first: Vec<_> = list.iter().collect();
		let second: Vec<_> = list.iter().collect();
		assert_eq!(first, second);
		assert_eq!(list.iter().count(), 2);
	}

	#[test]
	fn test_empty_list() {
		let list = VersionList::new(Vec::new(), None);
		assert!(list.is_empty());
		assert_eq!(list.iter().count(), 0);
	}

	#[test]
	fn test_serializes_flat_entries() {
		let list = VersionList::new(vec![item(1, 10), item(2, 20)], Some(Rev(2)));
		assert_eq!(
			serde_json::to_value(&list).unwrap(),
			json!([
				{ "rev": 2, "date": 20, "authorName": "Editor", "published": true },
				{ "rev": 1, "date": 10, "authorName": "Editor", "published": false },
			])
		);
	}
}

// vim: ts=4
