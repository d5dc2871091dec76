//! Row-to-entity grouping.
//!
//! Rows are folded into parent entities through a key map, so rows of the
//! same parent need not be adjacent. Output order is the order in which each
//! key was first seen.

use std::hash::Hash;

use bidboard_core::FlatRow;
use indexmap::IndexMap;

type KeyFn<'a, K> = Box<dyn Fn(&FlatRow) -> Option<K> + Send + Sync + 'a>;
type HeadFn<'a, E> = Box<dyn Fn(&FlatRow) -> E + Send + Sync + 'a>;
type ChildFn<'a, E> = Box<dyn Fn(&mut E, &FlatRow) + Send + Sync + 'a>;

/// Entities produced by one [`Grouper::run`], plus how many rows had no key.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<E> {
    pub entities: Vec<E>,
    pub skipped_rows: usize,
}

impl<E> Grouped<E> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Groups flat rows into entities of type `E` keyed by `K`.
///
/// - `key_of` returns `None` for rows that must be skipped (null parent key).
/// - `head` builds the entity from the first row seen for a key; later rows
///   never touch head fields.
/// - every child appender runs for every keyed row, including the first.
pub struct Grouper<'a, K, E> {
    key_of: KeyFn<'a, K>,
    head: HeadFn<'a, E>,
    children: Vec<ChildFn<'a, E>>,
}

impl<'a, K, E> Grouper<'a, K, E>
where
    K: Hash + Eq,
{
    pub fn new(
        key_of: impl Fn(&FlatRow) -> Option<K> + Send + Sync + 'a,
        head: impl Fn(&FlatRow) -> E + Send + Sync + 'a,
    ) -> Self {
        Self {
            key_of: Box::new(key_of),
            head: Box::new(head),
            children: Vec::new(),
        }
    }

    /// Register a child appender. Appenders run in registration order.
    pub fn child(mut self, appender: impl Fn(&mut E, &FlatRow) + Send + Sync + 'a) -> Self {
        self.children.push(Box::new(appender));
        self
    }

    pub fn run<'r>(&self, rows: impl IntoIterator<Item = &'r FlatRow>) -> Grouped<E> {
        let mut by_key: IndexMap<K, E> = IndexMap::new();
        let mut skipped_rows = 0;

        for row in rows {
            let Some(key) = (self.key_of)(row) else {
                skipped_rows += 1;
                continue;
            };
            let entity = by_key.entry(key).or_insert_with(|| (self.head)(row));
            for append in &self.children {
                append(entity, row);
            }
        }

        Grouped {
            entities: by_key.into_values().collect(),
            skipped_rows,
        }
    }
}

// ── Child collection policies ────────────────────────────────────

/// Append `item` unless an equal value is already present.
pub fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    if items.contains(&item) {
        return false;
    }
    items.push(item);
    true
}

/// Append `item` unless an existing element has the same sub-key.
pub fn push_unique_by<T, S: PartialEq>(items: &mut Vec<T>, item: T, sub_key: impl Fn(&T) -> S) -> bool {
    let wanted = sub_key(&item);
    if items.iter().any(|existing| sub_key(existing) == wanted) {
        return false;
    }
    items.push(item);
    true
}

/// Find the element matching `is_match`, creating it with `create` if absent.
pub fn entry_by<T>(items: &mut Vec<T>, is_match: impl Fn(&T) -> bool, create: impl FnOnce() -> T) -> &mut T {
    let idx = match items.iter().position(is_match) {
        Some(idx) => idx,
        None => {
            items.push(create());
            items.len() - 1
        }
    };
    &mut items[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidboard_core::Scalar;

    #[derive(Debug, PartialEq)]
    struct Parent {
        key: String,
        title: Scalar,
        children: Vec<String>,
    }

    fn grouper<'a>() -> Grouper<'a, String, Parent> {
        Grouper::new(
            |row: &FlatRow| row.text("k"),
            |row: &FlatRow| Parent {
                key: row.text("k").unwrap_or_default(),
                title: row.value("title"),
                children: Vec::new(),
            },
        )
        .child(|p: &mut Parent, row: &FlatRow| {
            if let Some(c) = row.text("c") {
                p.children.push(c);
            }
        })
    }

    fn row(k: Option<&str>, title: &str, c: &str) -> FlatRow {
        FlatRow::new().with("k", k).with("title", title).with("c", c)
    }

    #[test]
    fn groups_by_key_not_adjacency() {
        let rows = vec![
            row(Some("a"), "A", "1"),
            row(Some("b"), "B", "2"),
            row(Some("a"), "A", "3"),
        ];
        let out = grouper().run(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out.entities[0].key, "a");
        assert_eq!(out.entities[0].children, vec!["1", "3"]);
        assert_eq!(out.entities[1].children, vec!["2"]);
    }

    #[test]
    fn first_row_wins_for_head() {
        let rows = vec![row(Some("a"), "first", "1"), row(Some("a"), "second", "2")];
        let out = grouper().run(&rows);
        assert_eq!(out.entities[0].title, Scalar::from("first"));
    }

    #[test]
    fn null_key_rows_are_skipped_and_counted() {
        let rows = vec![row(None, "x", "1"), row(Some("a"), "A", "2"), row(None, "y", "3")];
        let out = grouper().run(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out.skipped_rows, 2);
        assert_eq!(out.entities[0].children, vec!["2"]);
    }

    #[test]
    fn empty_input() {
        let rows: Vec<FlatRow> = Vec::new();
        let out = grouper().run(&rows);
        assert!(out.is_empty());
        assert_eq!(out.skipped_rows, 0);
    }

    #[test]
    fn push_unique_suppresses_duplicates() {
        let mut v = vec!["x".to_string()];
        assert!(!push_unique(&mut v, "x".to_string()));
        assert!(push_unique(&mut v, "y".to_string()));
        assert_eq!(v, vec!["x", "y"]);
    }

    #[test]
    fn push_unique_by_compares_sub_key_only() {
        let mut v = vec![(1, "one")];
        assert!(!push_unique_by(&mut v, (1, "uno"), |t| t.0));
        assert!(push_unique_by(&mut v, (2, "two"), |t| t.0));
        assert_eq!(v, vec![(1, "one"), (2, "two")]);
    }

    #[test]
    fn entry_by_finds_or_creates() {
        let mut groups: Vec<(String, Vec<i32>)> = Vec::new();
        entry_by(&mut groups, |g| g.0 == "a", || ("a".into(), Vec::new())).1.push(1);
        entry_by(&mut groups, |g| g.0 == "b", || ("b".into(), Vec::new())).1.push(2);
        entry_by(&mut groups, |g| g.0 == "a", || ("a".into(), Vec::new())).1.push(3);
        assert_eq!(groups, vec![("a".into(), vec![1, 3]), ("b".into(), vec![2])]);
    }
}
