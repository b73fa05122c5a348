// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications and their delivery.
//!
//! Every notification goes to the listeners registered for its kind, in
//! registration order, and then to the single configured callback for that
//! kind, if any.

use core::fmt;
use std::collections::HashMap;

use scrollstory_items::Item;

/// Names of the notifications a story emits.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// An item was built and registered.
    ItemBuild,
    /// An item became active.
    ItemFocus,
    /// An item stopped being active.
    ItemBlur,
    /// An item was excluded from activation.
    ItemFilter,
    /// An item became eligible for activation again.
    ItemUnfilter,
    /// An item started overlapping the viewport.
    ItemEnterViewport,
    /// An item stopped overlapping the viewport.
    ItemExitViewport,
    /// The active category changed to this one.
    CategoryFocus,
    /// The active category changed away from this one.
    CategoryBlur,
    /// Some item became active while none was.
    ContainerActive,
    /// No item is active any more.
    ContainerInactive,
    /// Geometry was re-read.
    UpdateOffsets,
    /// A scroll repaint ran.
    ContainerScroll,
    /// A resize repaint ran.
    ContainerResize,
    /// Construction finished.
    Complete,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::ItemBuild,
        Self::ItemFocus,
        Self::ItemBlur,
        Self::ItemFilter,
        Self::ItemUnfilter,
        Self::ItemEnterViewport,
        Self::ItemExitViewport,
        Self::CategoryFocus,
        Self::CategoryBlur,
        Self::ContainerActive,
        Self::ContainerInactive,
        Self::UpdateOffsets,
        Self::ContainerScroll,
        Self::ContainerResize,
        Self::Complete,
    ];

    /// Lowercase wire name, e.g. `"itemfocus"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemBuild => "itembuild",
            Self::ItemFocus => "itemfocus",
            Self::ItemBlur => "itemblur",
            Self::ItemFilter => "itemfilter",
            Self::ItemUnfilter => "itemunfilter",
            Self::ItemEnterViewport => "itementerviewport",
            Self::ItemExitViewport => "itemexitviewport",
            Self::CategoryFocus => "categoryfocus",
            Self::CategoryBlur => "categoryblur",
            Self::ContainerActive => "containeractive",
            Self::ContainerInactive => "containerinactive",
            Self::UpdateOffsets => "updateoffsets",
            Self::ContainerScroll => "containerscroll",
            Self::ContainerResize => "containerresize",
            Self::Complete => "complete",
        }
    }

    /// Look a kind up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One emitted notification.
///
/// `item` is a snapshot taken at emission time for item-level kinds;
/// `category` is set for the category kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// What happened.
    pub kind: EventKind,
    /// The item concerned, if any.
    pub item: Option<Item>,
    /// The category concerned, if any.
    pub category: Option<String>,
}

impl Notification {
    /// Notification without payload.
    pub fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            item: None,
            category: None,
        }
    }

    /// Notification about an item.
    pub fn item(kind: EventKind, item: &Item) -> Self {
        Self {
            kind,
            item: Some(item.clone()),
            category: None,
        }
    }

    /// Notification about a category.
    pub fn category(kind: EventKind, category: impl Into<String>) -> Self {
        Self {
            kind,
            item: None,
            category: Some(category.into()),
        }
    }
}

type Handler = Box<dyn FnMut(&Notification)>;

/// Handle returned by [`Emitter::on`], used to remove the listener again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// One optional callback per notification kind, plus the build hook.
///
/// Lives in [`Options`](crate::Options); absent slots are no-ops.
#[derive(Default)]
pub struct Callbacks {
    slots: HashMap<EventKind, Handler>,
    item_build: Option<Box<dyn FnMut(&mut Item)>>,
}

impl Callbacks {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for `kind`, replacing any previous one.
    pub fn set(&mut self, kind: EventKind, f: impl FnMut(&Notification) + 'static) {
        self.slots.insert(kind, Box::new(f));
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, kind: EventKind, f: impl FnMut(&Notification) + 'static) -> Self {
        self.set(kind, f);
        self
    }

    /// Hook that may enrich each item while it is built, before it is
    /// registered and before `itembuild` is emitted.
    pub fn on_item_build(mut self, f: impl FnMut(&mut Item) + 'static) -> Self {
        self.item_build = Some(Box::new(f));
        self
    }

    /// Whether a callback is set for `kind`.
    pub fn contains(&self, kind: EventKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub(crate) fn enrich(&mut self, item: &mut Item) {
        if let Some(hook) = self.item_build.as_mut() {
            hook(item);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.slots.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Callbacks")
            .field("slots", &kinds)
            .field("item_build", &self.item_build.is_some())
            .finish()
    }
}

/// Listener registry plus the configured callbacks.
#[derive(Default)]
pub(crate) struct Emitter {
    listeners: Vec<(ListenerId, EventKind, Handler)>,
    callbacks: Callbacks,
    next_id: u64,
}

impl Emitter {
    pub(crate) fn new(callbacks: Callbacks) -> Self {
        Self {
            callbacks,
            ..Self::default()
        }
    }

    pub(crate) fn on(
        &mut self,
        kind: EventKind,
        f: impl FnMut(&Notification) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(f)));
        id
    }

    pub(crate) fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, notification: &Notification) {
        for (_, kind, handler) in &mut self.listeners {
            if *kind == notification.kind {
                handler(notification);
            }
        }
        if let Some(callback) = self.callbacks.slots.get_mut(&notification.kind) {
            callback(notification);
        }
    }

    pub(crate) fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
        self.callbacks = Callbacks::default();
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .field("callbacks", &self.callbacks)
            .field("next_id", &self.next_id)
            .finish()
    }
}
