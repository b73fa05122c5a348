// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ScrollStory Layout: a Kurbo-native offset cache and scroll position resolver.
//!
//! - [`GeometryProvider`]: the host capability that reports element, container,
//!   scroll and viewport geometry in document space.
//! - [`OffsetCache`]: reads item and container geometry into the store and
//!   reports what moved. Run it on structural change, not per frame.
//! - [`Resolver`]: per scroll position, computes every item's signed distance
//!   to the trigger line, scroll completion and viewport membership, the
//!   container aggregates, and the natural active candidate.
//!
//! ## Not a layout engine
//!
//! Nothing here measures or arranges content. The host lays items out however
//! it likes and reports the resulting rectangles through [`GeometryProvider`].
//! [`StaticGeometry`] is an in-memory provider for headless use and tests.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::Size;
//! use scrollstory_items::{ElementKey, ItemDraft, ItemStore};
//! use scrollstory_layout::{OffsetCache, Resolver, StaticGeometry, Viewport};
//!
//! let mut store = ItemStore::new();
//! for i in 0..3 {
//!     store.add_item(ItemDraft::new(ElementKey(i)), |_| {}).unwrap();
//! }
//! let mut geometry =
//!     StaticGeometry::stacked(0.0, 320.0, &[200.0, 200.0, 200.0], Size::new(320.0, 480.0));
//!
//! let mut cache = OffsetCache::new();
//! let _ = cache.refresh(&mut store, &geometry);
//!
//! geometry.set_scroll_top(250.0);
//! let resolved = Resolver::default().resolve(
//!     &mut store,
//!     &cache,
//!     Viewport::from_provider(&geometry),
//!     0.0,
//! );
//! assert_eq!(resolved.candidate, Some(1));
//! assert!(resolved.container.in_active_area);
//! ```

mod cache;
mod provider;
mod resolve;

pub use cache::{ContainerGeometry, OffsetCache, OffsetDamage};
pub use provider::{GeometryProvider, StaticGeometry};
pub use resolve::{
    ActivationPolicy, AreaBoundary, ContainerPositions, ResolvedPositions, Resolver, Viewport,
    ViewportEvent, percent_complete,
};
