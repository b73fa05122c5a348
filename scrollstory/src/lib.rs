// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ScrollStory: track which item of a vertical story is active as the user
//! scrolls, and say so.
//!
//! ## Overview
//!
//! A story is an ordered stack of content blocks ("items") inside a
//! container. A trigger line sits a fixed distance below the viewport top.
//! As the document scrolls, the item that most recently crossed the line
//! becomes active; crossing, filtering and category changes are reported as
//! notifications.
//!
//! ## Pipeline
//!
//! Scroll and resize signals go through the [`UpdateScheduler`](schedule::UpdateScheduler),
//! which throttles or debounces them into repaints. Each repaint runs, in a
//! fixed order:
//!
//! 1) offset refresh, only when requested ([`scrollstory_layout::OffsetCache`]),
//! 2) position resolution ([`scrollstory_layout::Resolver`]),
//! 3) the active-item decision ([`ActiveState`](state::ActiveState)),
//! 4) notification delivery.
//!
//! ## Layering
//!
//! - `scrollstory_items`: the item store, queries and errors.
//! - `scrollstory_layout`: geometry, the offset cache and the resolver.
//! - this crate: state machine, scheduler, notifications, options and the
//!   [`ScrollStory`] facade, over a [`Host`] that supplies geometry, element
//!   lookup and scrolling. [`MemoryHost`] is an in-memory host.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::Size;
//! use scrollstory::{Content, EventKind, MemoryHost, Options, ScrollStory};
//!
//! let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 480.0));
//! let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
//! assert_eq!(story.index(), Some(0));
//!
//! story.on(EventKind::ItemFocus, |n| {
//!     let item = n.item.as_ref().unwrap();
//!     println!("now reading {}", item.id);
//! });
//!
//! story.host_mut().set_scroll_top(250.0);
//! story.scroll(0);
//! assert_eq!(story.active_item().map(|i| i.id.as_str()), Some("story-1"));
//! ```

mod events;
mod host;
mod options;
pub mod schedule;
pub mod state;
mod story;

pub use events::{Callbacks, EventKind, ListenerId, Notification};
pub use host::{Host, MemoryHost};
pub use options::Options;
pub use schedule::{ThrottleOptions, ThrottleType};
pub use story::{Content, Key, ScrollStory};

pub use scrollstory_items::{
    ElementKey, Error, Item, ItemFlags, ItemGeometry, Matcher, Offset, Result, TagMatch, Where,
};
pub use scrollstory_layout::{
    ActivationPolicy, AreaBoundary, ContainerPositions, GeometryProvider, StaticGeometry,
};
