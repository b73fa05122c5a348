// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ScrollStory Items: the ordered item store behind a scroll-driven story.
//!
//! A story is a vertical stack of content blocks ("items") inside a container.
//! This crate owns the items themselves and everything that can be said about
//! them without looking at a viewport:
//!
//! - [`ItemStore`]: insertion-ordered items with O(1) lookup by id and index,
//!   plus deduplicated category and tag registries.
//! - [`Item`]: id, index, category, tags, opaque `data`, cached geometry, the
//!   derived scroll distances and the [`ItemFlags`] state bits.
//! - [`Where`] / [`Matcher`]: property queries where each property is matched
//!   by value or by predicate.
//! - [`IdAllocator`]: per-store id generation.
//! - [`Error`]: the error taxonomy shared by the other ScrollStory crates.
//!
//! It does not depend on any geometry crate. The layout crate fills in
//! [`ItemGeometry`] and the derived distances; the state crate toggles the
//! `ACTIVE` and `FILTERED` flags.
//!
//! ## Minimal usage
//!
//! ```
//! use scrollstory_items::{ElementKey, ItemDraft, ItemStore, Where};
//! use serde_json::json;
//!
//! let mut store = ItemStore::new();
//! for (i, category) in ["intro", "body", "body"].into_iter().enumerate() {
//!     let data = json!({ "category": category, "tags": "a,b" });
//!     let draft = ItemDraft::new(ElementKey(i as u64))
//!         .with_data(data.as_object().cloned().unwrap_or_default());
//!     store.add_item(draft, |_| {}).unwrap();
//! }
//!
//! assert_eq!(store.categories(), &["intro", "body"]);
//! assert_eq!(store.get_by_id("story-1").map(|i| i.index), Some(1));
//! assert_eq!(store.query_where(&Where::new().eq("category", "body")).len(), 2);
//! ```

mod error;
mod ids;
mod query;
mod store;
mod types;

pub use error::{Error, Result};
pub use ids::IdAllocator;
pub use query::{Matcher, TagMatch, Where};
pub use store::{ItemDraft, ItemStore};
pub use types::{ElementKey, Item, ItemFlags, ItemGeometry, Offset};
