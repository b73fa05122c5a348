// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll position resolver.
//!
//! ## Overview
//!
//! Maps a scroll position onto the cached geometry: per-item signed distances
//! to the trigger line, scroll completion, viewport membership, container
//! aggregates, and the active-item candidate.
//!
//! ## Sign convention
//!
//! `distance = floor(item.top - scroll_top - trigger)`. Negative means the
//! item's top edge has passed above the trigger line. Flooring keeps
//! sub-pixel scroll positions from flipping the sign around zero.
//!
//! ## Candidate selection
//!
//! - [`ActivationPolicy::Crossed`]: among unfiltered items with
//!   `adjusted_distance_to_offset <= 0`, pick the largest (least negative)
//!   distance. Nothing crossed means no candidate.
//! - [`ActivationPolicy::Nearest`]: among unfiltered items, pick the smallest
//!   absolute distance, above or below the line.
//!
//! In both modes comparisons are strict, so the lowest index wins ties.

use kurbo::Rect;
use scrollstory_items::{ItemFlags, ItemStore};
use serde::Deserialize;
use tracing::trace;

use crate::cache::OffsetCache;
use crate::provider::GeometryProvider;

/// How the active candidate is chosen.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationPolicy {
    /// Most recently crossed item; nothing before the first crossing.
    #[default]
    Crossed,
    /// Item nearest the trigger line, whether above or below it.
    ///
    /// Activation ahead of the trigger still happens only while the
    /// container is in its active area, which starts once the first item
    /// crosses. Turn off past-last-item deactivation to let the first item
    /// activate before that.
    Nearest,
}

/// Boundary rule for "the container is in its active area".
///
/// The top test is always `first_item_distance <= 0`. The bottom test
/// compares how far the container top has passed the trigger with the
/// container height.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaBoundary {
    /// Bottom must still be strictly below the trigger: `|d| - height < 0`.
    #[default]
    HalfOpen,
    /// Bottom exactly on the trigger still counts: `|d| - height <= 0`.
    Closed,
}

/// Scroll position and viewport size for one resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset.
    pub scroll_top: f64,
    /// Horizontal scroll offset.
    pub scroll_left: f64,
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Read the current viewport from a provider.
    pub fn from_provider(provider: &impl GeometryProvider) -> Self {
        let scroll = provider.scroll_offset();
        let size = provider.viewport_size();
        Self {
            scroll_top: scroll.y,
            scroll_left: scroll.x,
            width: size.width,
            height: size.height,
        }
    }

    /// Viewport with only a vertical position and a height, as most tests need.
    pub fn vertical(scroll_top: f64, height: f64) -> Self {
        Self {
            scroll_top,
            scroll_left: 0.0,
            width: f64::INFINITY,
            height,
        }
    }

    /// Visible document rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.scroll_left,
            self.scroll_top,
            self.scroll_left + self.width,
            self.scroll_top + self.height,
        )
    }
}

/// A change in an item's viewport membership.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ViewportEvent {
    /// Item at this index started overlapping the viewport.
    Enter(usize),
    /// Item at this index stopped overlapping the viewport.
    Exit(usize),
}

/// Container-level aggregates of one resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContainerPositions {
    /// Adjusted distance of the first item to the trigger line.
    pub distance_to_first_item: f64,
    /// Distance of the container's own top edge to the trigger line; differs
    /// from the first item when chrome sits above it.
    pub distance_to_offset: f64,
    /// Mean `percent_scroll_complete` across all items.
    pub percent_scrolled: f64,
    /// Progress from the first item's crossing to the last item's, in `[0, 1]`.
    pub last_item_progress: f64,
    /// Container top has crossed the trigger and its bottom has not.
    pub in_active_area: bool,
}

/// Output of [`Resolver::resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedPositions {
    /// Container aggregates.
    pub container: ContainerPositions,
    /// Natural active candidate under the resolver's policy.
    pub candidate: Option<usize>,
    /// Viewport membership edges, in index order.
    pub viewport_events: Vec<ViewportEvent>,
}

/// Computes item and container positions relative to the trigger line.
#[derive(Copy, Clone, Debug, Default)]
pub struct Resolver {
    policy: ActivationPolicy,
    boundary: AreaBoundary,
}

impl Resolver {
    /// Resolver with the given selection policy and the default boundary.
    pub fn new(policy: ActivationPolicy) -> Self {
        Self {
            policy,
            boundary: AreaBoundary::default(),
        }
    }

    /// Change the active-area boundary rule.
    pub fn with_boundary(mut self, boundary: AreaBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Selection policy in use.
    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    /// Active-area boundary in use.
    pub fn boundary(&self) -> AreaBoundary {
        self.boundary
    }

    /// Recompute every item's derived position fields and the container
    /// aggregates for `viewport`, with the global trigger line `trigger`
    /// pixels below the viewport top.
    ///
    /// Reads geometry from the store and `cache` only; refresh the cache first
    /// whenever layout changed.
    pub fn resolve(
        &self,
        store: &mut ItemStore,
        cache: &OffsetCache,
        viewport: Viewport,
        trigger: f64,
    ) -> ResolvedPositions {
        let view = viewport.rect();
        let mut events = Vec::new();
        let mut percent_total = 0.0;

        for item in store.iter_mut() {
            let g = item.geometry;
            item.distance_to_offset = (g.top_offset - viewport.scroll_top - trigger).floor();
            item.adjusted_distance_to_offset = match item.trigger_offset {
                None => item.distance_to_offset,
                Some(own) => {
                    (g.top_offset - viewport.scroll_top - own.resolve(viewport.height)).floor()
                }
            };
            item.percent_scroll_complete = percent_complete(item.distance_to_offset, g.height);
            percent_total += item.percent_scroll_complete;

            let bounds =
                Rect::new(g.left_offset, g.top_offset, g.left_offset + g.width, g.bottom());
            let was_in = item.in_viewport();
            let is_in = overlaps(view, bounds);
            item.set_flags(ItemFlags::IN_VIEWPORT, is_in);
            item.set_flags(ItemFlags::FULLY_IN_VIEWPORT, contains(view, bounds));
            match (was_in, is_in) {
                (false, true) => events.push(ViewportEvent::Enter(item.index)),
                (true, false) => events.push(ViewportEvent::Exit(item.index)),
                _ => {}
            }
        }

        let container = self.container_positions(store, cache, viewport, trigger, percent_total);
        let candidate = self.select_candidate(store);
        trace!(
            scroll_top = viewport.scroll_top,
            trigger,
            ?candidate,
            in_active_area = container.in_active_area,
            "positions resolved"
        );
        ResolvedPositions {
            container,
            candidate,
            viewport_events: events,
        }
    }

    /// Pick the natural active candidate from the store's current distances.
    pub fn select_candidate(&self, store: &ItemStore) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for item in store.iter().filter(|item| !item.is_filtered()) {
            let d = item.adjusted_distance_to_offset;
            best = match self.policy {
                ActivationPolicy::Crossed => {
                    if d > 0.0 {
                        continue;
                    }
                    match best {
                        Some((_, b)) if b >= d => best,
                        _ => Some((item.index, d)),
                    }
                }
                ActivationPolicy::Nearest => match best {
                    Some((_, b)) if b <= d.abs() => best,
                    _ => Some((item.index, d.abs())),
                },
            };
        }
        best.map(|(index, _)| index)
    }

    fn container_positions(
        &self,
        store: &ItemStore,
        cache: &OffsetCache,
        viewport: Viewport,
        trigger: f64,
        percent_total: f64,
    ) -> ContainerPositions {
        let items = store.items();
        let (Some(first), Some(last)) = (items.first(), items.last()) else {
            return ContainerPositions::default();
        };
        let c = cache.container();
        let distance_to_first_item = first.adjusted_distance_to_offset;
        let distance_to_offset = (c.top_offset - viewport.scroll_top - trigger).floor();
        let past = distance_to_offset.abs() - c.height;
        let bottom_below = match self.boundary {
            AreaBoundary::HalfOpen => past < 0.0,
            AreaBoundary::Closed => past <= 0.0,
        };

        let span = last.geometry.top_offset - first.geometry.top_offset;
        let last_item_progress = if span <= 0.0 {
            if last.distance_to_offset <= 0.0 { 1.0 } else { 0.0 }
        } else {
            (-first.distance_to_offset / span).clamp(0.0, 1.0)
        };

        ContainerPositions {
            distance_to_first_item,
            distance_to_offset,
            percent_scrolled: percent_total / items.len() as f64,
            last_item_progress,
            in_active_area: distance_to_first_item <= 0.0 && bottom_below,
        }
    }
}

/// Share of an item's height that has passed the trigger line.
///
/// Exactly 0 while `distance >= 0`, exactly 1 once `|distance| >= height`,
/// linear in between.
pub fn percent_complete(distance: f64, height: f64) -> f64 {
    if distance >= 0.0 {
        0.0
    } else if height <= 0.0 || -distance >= height {
        1.0
    } else {
        -distance / height
    }
}

// At least one visible pixel row: edges touching vertically do not count.
// Horizontally touching still counts so zero-width elements are tracked.
fn overlaps(view: Rect, r: Rect) -> bool {
    r.y0 < view.y1 && view.y0 < r.y1 && r.x0 <= view.x1 && view.x0 <= r.x1
}

fn contains(view: Rect, r: Rect) -> bool {
    r.x0 >= view.x0 && r.y0 >= view.y0 && r.x1 <= view.x1 && r.y1 <= view.y1
}
