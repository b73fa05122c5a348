// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset cache: the single place where item and container geometry is read.

use kurbo::Rect;
use scrollstory_items::{ItemGeometry, ItemStore};
use tracing::{debug, warn};

use crate::provider::GeometryProvider;

/// Cached geometry of the story container.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContainerGeometry {
    /// Distance from the document top to the container's top edge.
    pub top_offset: f64,
    /// Distance from the document left edge to the container's left edge.
    pub left_offset: f64,
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
}

impl ContainerGeometry {
    fn from_rect(r: Rect) -> Self {
        Self {
            top_offset: r.y0,
            left_offset: r.x0,
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Summary of what a refresh changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetDamage {
    /// Indices of items whose geometry changed.
    pub moved: Vec<usize>,
    /// Indices of items the provider no longer knows; their old geometry is kept.
    pub missing: Vec<usize>,
    /// Whether the container geometry changed.
    pub container_moved: bool,
}

impl OffsetDamage {
    /// True if nothing changed and nothing went missing.
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.missing.is_empty() && !self.container_moved
    }
}

/// Holds container geometry and writes item geometry into the store.
///
/// Refreshing is O(n) in the item count. Call it on structural change
/// (items added, resize, explicit request), not on every scroll frame.
#[derive(Clone, Debug, Default)]
pub struct OffsetCache {
    container: ContainerGeometry,
    epoch: u64,
}

impl OffsetCache {
    /// Empty cache; nothing has been read yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached container geometry.
    pub fn container(&self) -> ContainerGeometry {
        self.container
    }

    /// Number of completed refreshes.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Re-read every item's geometry and then the container's.
    pub fn refresh(
        &mut self,
        store: &mut ItemStore,
        provider: &impl GeometryProvider,
    ) -> OffsetDamage {
        let mut damage = OffsetDamage::default();
        for item in store.iter_mut() {
            let Some(bounds) = provider.element_bounds(item.element) else {
                warn!(index = item.index, id = %item.id, "element bounds unavailable");
                damage.missing.push(item.index);
                continue;
            };
            let geometry = ItemGeometry {
                top_offset: bounds.y0,
                left_offset: bounds.x0,
                width: bounds.width(),
                height: bounds.height(),
            };
            if geometry != item.geometry {
                item.geometry = geometry;
                damage.moved.push(item.index);
            }
        }

        let container = ContainerGeometry::from_rect(provider.container_bounds());
        damage.container_moved = container != self.container;
        self.container = container;
        self.epoch += 1;

        debug!(
            epoch = self.epoch,
            moved = damage.moved.len(),
            missing = damage.missing.len(),
            container_moved = damage.container_moved,
            "offsets refreshed"
        );
        damage
    }
}
