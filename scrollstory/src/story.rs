// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The story facade: ingestion, the repaint pipeline, navigation, filtering.

use core::ops::Range;

use scrollstory_items::{
    ElementKey, Error, IdAllocator, Item, ItemDraft, ItemStore, Result, TagMatch, Where,
};
use scrollstory_layout::{
    ContainerPositions, OffsetCache, OffsetDamage, Resolver, Viewport, ViewportEvent,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::events::{Emitter, EventKind, ListenerId, Notification};
use crate::host::Host;
use crate::options::Options;
use crate::schedule::{Cause, Repaint, UpdateScheduler};
use crate::state::{ActivationRules, ActiveState, Transition};

/// Where a story's items come from. Exactly one form per call.
#[derive(Clone, Debug)]
pub enum Content {
    /// Elements matching [`Options::content_selector`].
    Default,
    /// Elements matching this selector.
    Selector(String),
    /// These elements, in this order.
    Elements(Vec<ElementKey>),
    /// One new element per record; the record becomes the item's data.
    Records(Vec<Map<String, Value>>),
}

/// Navigation keys.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// Move to the previous item.
    Left,
    /// Move to the next item.
    Right,
}

/// A scroll-driven story over the content of one container.
///
/// Feed it scroll and resize signals with millisecond timestamps, call
/// [`tick`](Self::tick) when [`next_deadline`](Self::next_deadline) passes,
/// and listen for notifications with [`on`](Self::on).
///
/// Each repaint runs, in order: offset refresh (only when requested),
/// position resolution, the active-item decision, then the
/// `containerscroll`/`containerresize` notification.
#[derive(Debug)]
pub struct ScrollStory<H: Host> {
    host: H,
    options: Options,
    store: ItemStore,
    cache: OffsetCache,
    resolver: Resolver,
    state: ActiveState,
    scheduler: UpdateScheduler,
    emitter: Emitter,
    container: ContainerPositions,
    enabled: bool,
}

impl<H: Host> ScrollStory<H> {
    /// Build a story: ingest `content`, read geometry, resolve the initial
    /// active item, and emit `complete`.
    ///
    /// Fails with [`Error::MisconfiguredContent`] if no items were found and
    /// [`Error::InvalidArgument`] on malformed content.
    pub fn new(host: H, content: Content, mut options: Options) -> Result<Self> {
        let emitter = Emitter::new(core::mem::take(&mut options.callbacks));
        let rules = ActivationRules {
            auto_activate_first_item: options.auto_activate_first_item,
            disable_past_last_item: options.disable_past_last_item,
        };
        let mut story = Self {
            host,
            store: ItemStore::with_allocator(IdAllocator::new(options.id_prefix.clone())),
            cache: OffsetCache::new(),
            resolver: Resolver::new(options.activation_policy).with_boundary(options.area_boundary),
            state: ActiveState::new(rules),
            scheduler: UpdateScheduler::from_options(&options),
            emitter,
            container: ContainerPositions::default(),
            enabled: options.enabled,
            options,
        };

        let _ = story.ingest(content)?;
        let _ = story.update_offsets();
        if story.enabled {
            story.resolve_and_decide();
        }
        debug!(items = story.store.len(), "story built");
        story.emitter.emit(&Notification::bare(EventKind::Complete));
        Ok(story)
    }

    /// Append more items, then refresh offsets and repaint.
    ///
    /// All or nothing: on error no item is added and nothing is emitted.
    pub fn add_items(&mut self, content: Content) -> Result<Range<usize>> {
        let range = self.ingest(content)?;
        self.scheduler.request_refresh();
        let job = self.scheduler.request();
        self.run(job);
        Ok(range)
    }

    // Signals and the pipeline.

    /// Scroll signal at `now_ms`. Repaints right away if the limiter lets it
    /// through; otherwise the repaint may come from [`tick`](Self::tick).
    pub fn scroll(&mut self, now_ms: u64) {
        if !self.enabled {
            return;
        }
        if let Some(job) = self.scheduler.scroll(now_ms) {
            self.run(job);
        }
    }

    /// Resize signal at `now_ms`. Always debounced.
    pub fn resize(&mut self, now_ms: u64) {
        if self.enabled {
            self.scheduler.resize(now_ms);
        }
    }

    /// Run every deferred repaint due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.enabled {
            return;
        }
        for job in self.scheduler.poll(now_ms) {
            self.run(job);
        }
    }

    /// When [`tick`](Self::tick) next has work, if ever.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Repaint now, refreshing offsets first if a refresh is pending.
    pub fn repaint(&mut self) {
        let job = self.scheduler.request();
        self.run(job);
    }

    /// Re-read all geometry now and emit `updateoffsets`.
    pub fn update_offsets(&mut self) -> OffsetDamage {
        let damage = self.cache.refresh(&mut self.store, &self.host);
        self.emitter.emit(&Notification::bare(EventKind::UpdateOffsets));
        if self.options.debug {
            let viewport = Viewport::from_provider(&self.host);
            let trigger = self.options.trigger_offset.resolve(viewport.height);
            info!(
                trigger_y = viewport.scroll_top + trigger,
                trigger,
                container_top = self.cache.container().top_offset,
                "trigger line"
            );
        }
        damage
    }

    fn run(&mut self, job: Repaint) {
        debug!(refresh = job.refresh_offsets, cause = ?job.cause, "repaint");
        if job.refresh_offsets {
            let _ = self.update_offsets();
        }
        self.resolve_and_decide();
        match job.cause {
            Cause::Scroll => self.emitter.emit(&Notification::bare(EventKind::ContainerScroll)),
            Cause::Resize => self.emitter.emit(&Notification::bare(EventKind::ContainerResize)),
            Cause::Request => {}
        }
    }

    fn resolve_and_decide(&mut self) {
        let viewport = Viewport::from_provider(&self.host);
        let trigger = self.options.trigger_offset.resolve(viewport.height);
        let resolved = self
            .resolver
            .resolve(&mut self.store, &self.cache, viewport, trigger);
        self.container = resolved.container;

        for event in resolved.viewport_events {
            match event {
                ViewportEvent::Enter(i) => self.emit_item(EventKind::ItemEnterViewport, i),
                ViewportEvent::Exit(i) => self.emit_item(EventKind::ItemExitViewport, i),
            }
        }
        let transitions = self.state.apply(
            &mut self.store,
            resolved.candidate,
            resolved.container.in_active_area,
        );
        self.dispatch(transitions);
    }

    // Ingestion.

    fn ingest(&mut self, content: Content) -> Result<Range<usize>> {
        let drafts = match content {
            Content::Default => {
                let elements = self.host.select(&self.options.content_selector);
                self.element_drafts(elements)
            }
            Content::Selector(selector) => {
                if selector.trim().is_empty() {
                    return Err(Error::InvalidArgument("empty content selector".into()));
                }
                let elements = self.host.select(&selector);
                self.element_drafts(elements)
            }
            Content::Elements(elements) => self.element_drafts(elements),
            Content::Records(records) => {
                // Reject a bad batch before it leaves elements in the host.
                let preview: Vec<_> = records
                    .iter()
                    .map(|record| ItemDraft::new(ElementKey(u64::MAX)).with_data(record.clone()))
                    .collect();
                self.store.check(&preview)?;
                let class = self.options.content_class().to_owned();
                let mut drafts = Vec::with_capacity(records.len());
                for record in records {
                    let element = self.host.create_element(&class, &record);
                    drafts.push(self.draft(element, record));
                }
                drafts
            }
        };

        let callbacks = self.emitter.callbacks_mut();
        let range = self.store.add_items(drafts, |item| callbacks.enrich(item))?;
        for index in range.clone() {
            self.emit_item(EventKind::ItemBuild, index);
        }
        Ok(range)
    }

    fn element_drafts(&self, elements: Vec<ElementKey>) -> Vec<ItemDraft> {
        elements
            .into_iter()
            .map(|element| self.draft(element, Map::new()))
            .collect()
    }

    // Element attributes are layered over programmatic data; the element's own
    // id wins over `data["id"]`.
    fn draft(&self, element: ElementKey, mut data: Map<String, Value>) -> ItemDraft {
        data.extend(self.host.attributes(element));
        let draft = ItemDraft::new(element).with_data(data);
        match self.host.element_id(element) {
            Some(id) => draft.with_id(id),
            None => draft,
        }
    }

    // Notifications.

    /// Listen for `kind`. Listeners run in registration order, before the
    /// configured callback.
    pub fn on(&mut self, kind: EventKind, f: impl FnMut(&Notification) + 'static) -> ListenerId {
        self.emitter.on(kind, f)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    fn emit_item(&mut self, kind: EventKind, index: usize) {
        if let Some(item) = self.store.get_by_index(index) {
            self.emitter.emit(&Notification::item(kind, item));
        }
    }

    fn dispatch(&mut self, transitions: Vec<Transition>) {
        for transition in transitions {
            match transition {
                Transition::ItemBlur(i) => self.emit_item(EventKind::ItemBlur, i),
                Transition::ItemFocus(i) => self.emit_item(EventKind::ItemFocus, i),
                Transition::ItemFilter(i) => self.emit_item(EventKind::ItemFilter, i),
                Transition::ItemUnfilter(i) => self.emit_item(EventKind::ItemUnfilter, i),
                Transition::CategoryBlur(c) => self
                    .emitter
                    .emit(&Notification::category(EventKind::CategoryBlur, c)),
                Transition::CategoryFocus(c) => self
                    .emitter
                    .emit(&Notification::category(EventKind::CategoryFocus, c)),
                Transition::ContainerActive => self
                    .emitter
                    .emit(&Notification::bare(EventKind::ContainerActive)),
                Transition::ContainerInactive => self
                    .emitter
                    .emit(&Notification::bare(EventKind::ContainerInactive)),
            }
        }
    }

    // Lookups.

    /// All items in index order.
    pub fn items(&self) -> &[Item] {
        self.store.items()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if the story has no items (only after [`destroy`](Self::destroy)).
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Item with this id.
    pub fn item_by_id(&self, id: &str) -> Option<&Item> {
        self.store.get_by_id(id)
    }

    /// Item at this index.
    pub fn item_by_index(&self, index: usize) -> Option<&Item> {
        self.store.get_by_index(index)
    }

    /// Items matching every entry of `query`.
    pub fn items_where(&self, query: &Where) -> Vec<&Item> {
        self.store.query_where(query)
    }

    /// Items for which `predicate` holds.
    pub fn items_by(&self, predicate: impl Fn(&Item) -> bool) -> Vec<&Item> {
        self.store.query(predicate)
    }

    /// Items overlapping the viewport at the last repaint.
    pub fn items_in_viewport(&self) -> Vec<&Item> {
        self.store.in_viewport()
    }

    /// Items in `category`.
    pub fn items_by_category(&self, category: &str) -> Vec<&Item> {
        self.store.items_by_category(category)
    }

    /// Items carrying any or all of `tags`.
    pub fn items_by_tag(&self, tags: &[&str], mode: TagMatch) -> Vec<&Item> {
        self.store.items_by_tag(tags, mode)
    }

    /// Known categories, in first-seen order.
    pub fn categories(&self) -> &[String] {
        self.store.categories()
    }

    /// Known tags, in first-seen order.
    pub fn tags(&self) -> &[String] {
        self.store.tags()
    }

    /// The active item.
    pub fn active_item(&self) -> Option<&Item> {
        self.state.active().and_then(|i| self.store.get_by_index(i))
    }

    /// Category of the active item.
    pub fn active_category(&self) -> Option<&str> {
        self.state.category()
    }

    /// Previously active items, most recent first.
    pub fn previous_items(&self) -> Vec<&Item> {
        self.state
            .history()
            .iter()
            .filter_map(|&i| self.store.get_by_index(i))
            .collect()
    }

    /// Whether some item is active.
    pub fn is_container_active(&self) -> bool {
        self.state.container_active()
    }

    /// Container aggregates from the last repaint.
    pub fn container(&self) -> ContainerPositions {
        self.container
    }

    /// Options in effect. Callbacks have moved into the story and read as empty.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably; call [`repaint`](Self::repaint) or signal a scroll
    /// after changing what it reports.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // Navigation.

    /// Index of the active item.
    pub fn index(&self) -> Option<usize> {
        self.state.active()
    }

    /// Scroll to the item at `index`. Same as [`scroll_to_index`](Self::scroll_to_index).
    pub fn set_index(&mut self, index: usize) -> bool {
        self.scroll_to_index(index)
    }

    /// Scroll to the item after the active one, or to the first item if
    /// none is active.
    pub fn next(&mut self) -> bool {
        let target = self.state.active().map_or(0, |i| i + 1);
        self.scroll_to_index(target)
    }

    /// Scroll to the item before the active one.
    pub fn previous(&mut self) -> bool {
        match self.state.active() {
            Some(i) if i > 0 => self.scroll_to_index(i - 1),
            _ => false,
        }
    }

    /// Scroll so the item with `id` sits at its scroll offset.
    pub fn scroll_to_item(&mut self, id: &str) -> bool {
        match self.store.index_of(id) {
            Some(index) => self.scroll_to_index(index),
            None => false,
        }
    }

    /// Scroll to the first item of `category`.
    pub fn scroll_to_category(&mut self, category: &str) -> bool {
        let first = self.store.items_by_category(category).first().map(|i| i.index);
        first.is_some_and(|index| self.scroll_to_index(index))
    }

    /// Scroll so the item at `index` sits at its scroll offset, then
    /// repaint. Returns `false` if there is no such item.
    ///
    /// The item's own `scrollOffset` wins over the global one; percentages
    /// resolve against the viewport height.
    pub fn scroll_to_index(&mut self, index: usize) -> bool {
        let Some(item) = self.store.get_by_index(index) else {
            return false;
        };
        let height = self.host.viewport_size().height;
        let offset = item
            .scroll_offset
            .unwrap_or(self.options.scroll_offset)
            .resolve(height);
        let y = item.geometry.top_offset - offset;
        debug!(index, y, "scroll to item");
        self.host.scroll_to(y);
        if self.enabled {
            self.repaint();
        }
        true
    }

    /// Handle a navigation key. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.options.keyboard || !self.enabled {
            return false;
        }
        match key {
            Key::Left => self.previous(),
            Key::Right => self.next(),
        }
    }

    // Filtering.

    /// Filter the item with `id`. Returns `false` if there is no such item.
    pub fn filter(&mut self, id: &str) -> bool {
        match self.store.index_of(id) {
            Some(index) => {
                self.filter_indices(vec![index]);
                true
            }
            None => false,
        }
    }

    /// Unfilter the item with `id`. Returns `false` if there is no such item.
    pub fn unfilter(&mut self, id: &str) -> bool {
        match self.store.index_of(id) {
            Some(index) => {
                self.unfilter_indices(vec![index]);
                true
            }
            None => false,
        }
    }

    /// Filter every item.
    pub fn filter_all(&mut self) {
        self.filter_indices((0..self.store.len()).collect());
    }

    /// Unfilter every item.
    pub fn unfilter_all(&mut self) {
        self.unfilter_indices((0..self.store.len()).collect());
    }

    /// Filter the items matching `query`.
    pub fn filter_where(&mut self, query: &Where) {
        let indices = indices(self.store.query_where(query));
        self.filter_indices(indices);
    }

    /// Unfilter the items matching `query`.
    pub fn unfilter_where(&mut self, query: &Where) {
        let indices = indices(self.store.query_where(query));
        self.unfilter_indices(indices);
    }

    /// Filter the items for which `predicate` holds.
    pub fn filter_by(&mut self, predicate: impl Fn(&Item) -> bool) {
        let indices = indices(self.store.query(predicate));
        self.filter_indices(indices);
    }

    /// Filter the items carrying any or all of `tags`.
    pub fn filter_by_tag(&mut self, tags: &[&str], mode: TagMatch) {
        let indices = indices(self.store.items_by_tag(tags, mode));
        self.filter_indices(indices);
    }

    /// Unfilter the items carrying any or all of `tags`.
    pub fn unfilter_by_tag(&mut self, tags: &[&str], mode: TagMatch) {
        let indices = indices(self.store.items_by_tag(tags, mode));
        self.unfilter_indices(indices);
    }

    fn filter_indices(&mut self, indices: Vec<usize>) {
        for index in indices {
            let transitions = self.state.filter(&mut self.store, index);
            self.dispatch(transitions);
        }
    }

    fn unfilter_indices(&mut self, indices: Vec<usize>) {
        for index in indices {
            let transitions = self.state.unfilter(&mut self.store, index);
            self.dispatch(transitions);
        }
    }

    // Lifecycle.

    /// Resume scroll processing.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Ignore scroll and resize signals until [`enable`](Self::enable).
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether scroll processing is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all items, listeners, callbacks and pending work, and disable
    /// the story. Nothing is emitted.
    pub fn destroy(&mut self) {
        self.scheduler.cancel();
        self.state.reset();
        self.store.clear();
        self.emitter.clear();
        self.cache = OffsetCache::new();
        self.container = ContainerPositions::default();
        self.enabled = false;
        debug!("story destroyed");
    }
}

fn indices(items: Vec<&Item>) -> Vec<usize> {
    items.into_iter().map(|item| item.index).collect()
}
