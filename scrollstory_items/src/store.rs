// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core store implementation: ingestion, lookups, registries, and queries.

use core::ops::Range;
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::IdAllocator;
use crate::query::{TagMatch, Where};
use crate::types::{ElementKey, Item, ItemFlags, ItemGeometry, Offset};

/// Input for one new item.
///
/// `data` carries the merged user payload. The store reads a few well-known
/// keys from it: `id` (used when `id` is `None`), `category`, `tags` (array
/// of strings or a comma separated string), `scrollOffset` and
/// `triggerOffset` (`false` or `null` meaning "use the global offset").
#[derive(Clone, Debug)]
pub struct ItemDraft {
    /// Explicit id; wins over `data["id"]` and over generated ids.
    pub id: Option<String>,
    /// Host element backing the item.
    pub element: ElementKey,
    /// User payload.
    pub data: Map<String, Value>,
}

impl ItemDraft {
    /// Draft for `element` with an empty payload.
    pub fn new(element: ElementKey) -> Self {
        Self {
            id: None,
            element,
            data: Map::new(),
        }
    }

    /// Set the payload.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Ordered collection of items with O(1) lookup by id and index.
///
/// Categories and tags are kept as insertion-ordered registries without
/// duplicates.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    by_id: HashMap<String, usize>,
    categories: Vec<String>,
    tags: Vec<String>,
    ids: IdAllocator,
}

impl ItemStore {
    /// Create an empty store with the default id allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that generates ids with `ids`.
    pub fn with_allocator(ids: IdAllocator) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Append one item.
    ///
    /// `on_build` sees the fully constructed item before it is registered and
    /// may enrich it (category, tags, data, offsets). Its `id`, `index` and
    /// state flags are restored afterwards, so the hook cannot break store
    /// invariants. The category and tags are registered after the hook runs.
    pub fn add_item(
        &mut self,
        draft: ItemDraft,
        on_build: impl FnOnce(&mut Item),
    ) -> Result<&Item> {
        let ItemDraft { id, element, data } = draft;
        let Fields {
            category,
            tags,
            scroll_offset,
            trigger_offset,
        } = Fields::parse(&data)?;
        let id = match explicit_id(id, &data)? {
            Some(id) if id.is_empty() => return Err(Error::invalid("item id is empty")),
            Some(id) if self.by_id.contains_key(&id) => {
                return Err(Error::invalid(format!("duplicate item id {id:?}")));
            }
            Some(id) => id,
            None => self.ids.allocate(|candidate| self.by_id.contains_key(candidate)),
        };

        let index = self.items.len();
        let mut item = Item {
            id: id.clone(),
            index,
            element,
            category,
            tags,
            data,
            geometry: ItemGeometry::default(),
            distance_to_offset: 0.0,
            adjusted_distance_to_offset: 0.0,
            percent_scroll_complete: 0.0,
            scroll_offset,
            trigger_offset,
            flags: ItemFlags::empty(),
        };
        on_build(&mut item);
        item.id = id.clone();
        item.index = index;
        item.flags = ItemFlags::empty();

        if let Some(category) = &item.category
            && !self.categories.contains(category)
        {
            self.categories.push(category.clone());
        }
        for tag in &item.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }

        debug!(index, id = %id, category = ?item.category, "item added");
        self.by_id.insert(id, index);
        self.items.push(item);
        Ok(&self.items[index])
    }

    /// Append several items and return the index range they occupy.
    ///
    /// All or nothing: if any draft fails, the store is rolled back to its
    /// state before the call. Fails with [`Error::MisconfiguredContent`] if
    /// the store is still empty afterwards.
    pub fn add_items(
        &mut self,
        drafts: impl IntoIterator<Item = ItemDraft>,
        mut on_build: impl FnMut(&mut Item),
    ) -> Result<Range<usize>> {
        let start = self.items.len();
        let mark = (self.categories.len(), self.tags.len(), self.ids.clone());
        for draft in drafts {
            if let Err(err) = self.add_item(draft, &mut on_build) {
                self.rollback(start, mark);
                return Err(err);
            }
        }
        if self.items.is_empty() {
            return Err(Error::MisconfiguredContent);
        }
        Ok(start..self.items.len())
    }

    /// Check that `drafts` would all be accepted by
    /// [`add_items`](Self::add_items), without adding anything.
    ///
    /// Catches malformed fields and explicit ids that are empty, already
    /// taken, or repeated within the batch.
    pub fn check(&self, drafts: &[ItemDraft]) -> Result<()> {
        let mut seen = HashSet::new();
        for draft in drafts {
            if let Some(id) = explicit_id(draft.id.clone(), &draft.data)? {
                if id.is_empty() {
                    return Err(Error::invalid("item id is empty"));
                }
                if self.by_id.contains_key(&id) || !seen.insert(id.clone()) {
                    return Err(Error::invalid(format!("duplicate item id {id:?}")));
                }
            }
            let _ = Fields::parse(&draft.data)?;
        }
        Ok(())
    }

    fn rollback(&mut self, len: usize, (categories, tags, ids): (usize, usize, IdAllocator)) {
        for item in self.items.drain(len..) {
            self.by_id.remove(&item.id);
        }
        self.categories.truncate(categories);
        self.tags.truncate(tags);
        self.ids = ids;
        debug!(len, "ingestion rolled back");
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in index order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterate over items in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Mutable iteration, for the offset cache and the position resolver.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Item> {
        self.items.iter_mut()
    }

    /// Look up an item by id.
    pub fn get_by_id(&self, id: &str) -> Option<&Item> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Look up an item by index.
    pub fn get_by_index(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Index of the item with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Mutable access by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    /// Items for which `predicate` holds, in index order.
    pub fn query(&self, predicate: impl Fn(&Item) -> bool) -> Vec<&Item> {
        self.items.iter().filter(|&item| predicate(item)).collect()
    }

    /// Items matching every property matcher in `query`, in index order.
    pub fn query_where(&self, query: &Where) -> Vec<&Item> {
        self.query(|item| query.matches(item))
    }

    /// Items not currently filtered.
    pub fn unfiltered(&self) -> Vec<&Item> {
        self.query(|item| !item.is_filtered())
    }

    /// Items currently filtered.
    pub fn filtered(&self) -> Vec<&Item> {
        self.query(Item::is_filtered)
    }

    /// Items overlapping the viewport at the last resolution.
    pub fn in_viewport(&self) -> Vec<&Item> {
        self.query(Item::in_viewport)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Items in `category`.
    pub fn items_by_category(&self, category: &str) -> Vec<&Item> {
        self.query(|item| item.category.as_deref() == Some(category))
    }

    /// Items carrying any or all of `tags`.
    pub fn items_by_tag(&self, tags: &[&str], mode: TagMatch) -> Vec<&Item> {
        self.query(|item| {
            let has = |tag: &&str| item.tags.iter().any(|t| t == *tag);
            match mode {
                TagMatch::Any => tags.iter().any(has),
                TagMatch::All => tags.iter().all(has),
            }
        })
    }

    /// Drop every item and registry entry and restart id generation.
    pub fn clear(&mut self) {
        self.items.clear();
        self.by_id.clear();
        self.categories.clear();
        self.tags.clear();
        self.ids.reset();
    }
}

impl<'a> IntoIterator for &'a ItemStore {
    type Item = &'a Item;
    type IntoIter = core::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// Explicit ids beat `data["id"]`.
fn explicit_id(id: Option<String>, data: &Map<String, Value>) -> Result<Option<String>> {
    if id.is_some() {
        return Ok(id);
    }
    match data.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid(format!("item id {other} is not a string"))),
    }
}

struct Fields {
    category: Option<String>,
    tags: Vec<String>,
    scroll_offset: Option<Offset>,
    trigger_offset: Option<Offset>,
}

impl Fields {
    fn parse(data: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            category: parse_category(data.get("category"))?,
            tags: parse_tags(data.get("tags"))?,
            scroll_offset: parse_offset(data.get("scrollOffset"))?,
            trigger_offset: parse_offset(data.get("triggerOffset"))?,
        })
    }
}

// `false` means "use the global offset".
fn parse_offset(value: Option<&Value>) -> Result<Option<Offset>> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(value) => Offset::from_value(value).map(Some),
    }
}

fn parse_category(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::invalid(format!(
            "category must be a string, got {other}"
        ))),
    }
}

fn parse_tags(value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::invalid(format!("tag must be a string, got {other}"))),
            })
            .collect(),
        Some(other) => Err(Error::invalid(format!(
            "tags must be an array or comma separated string, got {other}"
        ))),
    }
}
