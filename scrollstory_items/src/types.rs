// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the item store: element handles, flags, geometry, offsets, and items.

use core::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Opaque handle of the host element backing an item.
///
/// The store never interprets it; the host that resolved the content (or
/// generated markup for data records) hands it out and uses it to answer
/// geometry queries later.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

bitflags::bitflags! {
    /// Per-item state flags.
    ///
    /// `ACTIVE` and `FILTERED` are owned by the active-item state machine;
    /// the viewport flags are recomputed by every position resolution.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// The single in-focus item.
        const ACTIVE            = 0b0000_0001;
        /// Excluded from activation, still present in the store.
        const FILTERED          = 0b0000_0010;
        /// Some part of the item overlaps the viewport.
        const IN_VIEWPORT       = 0b0000_0100;
        /// The whole item is inside the viewport.
        const FULLY_IN_VIEWPORT = 0b0000_1000;
    }
}

/// Cached document-space geometry of an item.
///
/// Written only by the offset cache; every other component reads it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ItemGeometry {
    /// Distance from the document top to the item's top edge.
    pub top_offset: f64,
    /// Distance from the document left edge to the item's left edge.
    pub left_offset: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl ItemGeometry {
    /// Bottom edge in document space.
    pub fn bottom(&self) -> f64 {
        self.top_offset + self.height
    }
}

/// A vertical offset from the viewport top, in pixels or as a share of the
/// viewport height.
///
/// Parses from a bare number (`"120"`), a pixel string (`"120px"`) or a
/// percentage (`"25%"`). Deserializes from either a JSON number or one of
/// those strings.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawOffset")]
pub enum Offset {
    /// Absolute pixels.
    Pixels(f64),
    /// Percent of the viewport height, `25.0` meaning a quarter.
    Percent(f64),
}

impl Default for Offset {
    fn default() -> Self {
        Self::Pixels(0.0)
    }
}

impl Offset {
    /// Resolve to pixels against the current viewport height.
    pub fn resolve(self, viewport_height: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(pct) => viewport_height * pct / 100.0,
        }
    }

    /// Interpret a JSON value as an offset.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Self::Pixels)
                .ok_or_else(|| Error::invalid(format!("offset {n} is not finite"))),
            Value::String(s) => s.parse(),
            other => Err(Error::invalid(format!(
                "offset must be a number or string, got {other}"
            ))),
        }
    }
}

impl FromStr for Offset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (number, percent) = if let Some(rest) = s.strip_suffix('%') {
            (rest, true)
        } else if let Some(rest) = s.strip_suffix("px") {
            (rest, false)
        } else {
            (s, false)
        };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| Error::invalid(format!("unparsable offset {s:?}")))?;
        if !value.is_finite() {
            return Err(Error::invalid(format!("offset {s:?} is not finite")));
        }
        Ok(if percent {
            Self::Percent(value)
        } else {
            Self::Pixels(value)
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffset {
    Number(f64),
    Text(String),
}

impl TryFrom<RawOffset> for Offset {
    type Error = Error;

    fn try_from(raw: RawOffset) -> Result<Self> {
        match raw {
            RawOffset::Number(px) => Ok(Self::Pixels(px)),
            RawOffset::Text(s) => s.parse(),
        }
    }
}

/// One content block tracked by the story.
///
/// Items are created by [`ItemStore::add_item`](crate::ItemStore::add_item)
/// and live until the store is cleared.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Unique identifier (explicit, or generated by the store's allocator).
    pub id: String,
    /// Position in store order; contiguous and 0-based.
    pub index: usize,
    /// Backing host element.
    pub element: ElementKey,
    /// Optional grouping tag.
    pub category: Option<String>,
    /// Ordered tags; may repeat, the store keeps the deduplicated union.
    pub tags: Vec<String>,
    /// Opaque user payload, element attributes layered over programmatic data.
    pub data: Map<String, Value>,
    /// Cached geometry.
    pub geometry: ItemGeometry,
    /// Signed pixels from the trigger line; negative once the item's top has crossed it.
    pub distance_to_offset: f64,
    /// Like `distance_to_offset` but measured against the item's own trigger override.
    pub adjusted_distance_to_offset: f64,
    /// Share of the item's height that has scrolled past the trigger line, in `[0, 1]`.
    pub percent_scroll_complete: f64,
    /// Per-item override of the programmatic scroll-to offset.
    pub scroll_offset: Option<Offset>,
    /// Per-item override of the trigger line.
    pub trigger_offset: Option<Offset>,
    pub(crate) flags: ItemFlags,
}

impl Item {
    /// Current state flags.
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    /// Whether this is the active item.
    pub fn is_active(&self) -> bool {
        self.flags.contains(ItemFlags::ACTIVE)
    }

    /// Whether the item is excluded from activation.
    pub fn is_filtered(&self) -> bool {
        self.flags.contains(ItemFlags::FILTERED)
    }

    /// Whether any part of the item overlapped the viewport at the last resolution.
    pub fn in_viewport(&self) -> bool {
        self.flags.contains(ItemFlags::IN_VIEWPORT)
    }

    /// Whether the whole item was inside the viewport at the last resolution.
    pub fn fully_in_viewport(&self) -> bool {
        self.flags.contains(ItemFlags::FULLY_IN_VIEWPORT)
    }

    /// Set or clear state flags.
    ///
    /// This is the mutation seam used by the layout and state crates. Setting
    /// `ACTIVE` here bypasses the at-most-one-active bookkeeping, so callers
    /// outside the state machine should stick to the viewport flags.
    pub fn set_flags(&mut self, flags: ItemFlags, on: bool) {
        self.flags.set(flags, on);
    }

    /// Look up a property by its camelCase name, as used by
    /// [`Where`](crate::Where) queries.
    ///
    /// Built-in fields win; other names fall back to `data`. Unknown names
    /// yield `Value::Null`.
    pub fn property(&self, name: &str) -> Value {
        match name {
            "id" => Value::from(self.id.as_str()),
            "index" => Value::from(self.index),
            "category" => self
                .category
                .as_deref()
                .map_or(Value::Null, Value::from),
            "tags" => Value::from(self.tags.clone()),
            "active" => Value::Bool(self.is_active()),
            "filtered" => Value::Bool(self.is_filtered()),
            "inViewport" => Value::Bool(self.in_viewport()),
            "fullyInViewport" => Value::Bool(self.fully_in_viewport()),
            "topOffset" => Value::from(self.geometry.top_offset),
            "width" => Value::from(self.geometry.width),
            "height" => Value::from(self.geometry.height),
            "distanceToOffset" => Value::from(self.distance_to_offset),
            "adjustedDistanceToOffset" => Value::from(self.adjusted_distance_to_offset),
            "percentScrollComplete" => Value::from(self.percent_scroll_complete),
            other => self.data.get(other).cloned().unwrap_or(Value::Null),
        }
    }
}
