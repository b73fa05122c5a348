// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host capability and an in-memory host.

use kurbo::{Point, Rect, Size, Vec2};
use scrollstory_items::ElementKey;
use scrollstory_layout::{GeometryProvider, StaticGeometry};
use serde_json::{Map, Value};

/// Everything a story needs from its environment.
///
/// On top of geometry, a host resolves selectors to elements, reports the
/// attributes attached to them, creates elements for data records, and
/// performs programmatic scrolling.
pub trait Host: GeometryProvider {
    /// Elements matching `selector` inside the container, in document order.
    fn select(&self, selector: &str) -> Vec<ElementKey>;

    /// The element's own id attribute, if it has one.
    fn element_id(&self, element: ElementKey) -> Option<String>;

    /// Key/value attributes attached to the element.
    fn attributes(&self, element: ElementKey) -> Map<String, Value>;

    /// Create an element with `class` inside the container for a data
    /// record, appended after the existing content.
    fn create_element(&mut self, class: &str, data: &Map<String, Value>) -> ElementKey;

    /// Scroll the document so its top is at `y`.
    fn scroll_to(&mut self, y: f64);
}

#[derive(Clone, Debug)]
struct ElementRecord {
    class: String,
    id: Option<String>,
    attributes: Map<String, Value>,
}

/// A host that keeps elements as a vertical stack in memory.
///
/// Elements are laid out top to bottom from the container top without gaps;
/// the container grows to wrap them. Selectors are `.class`, `#id`, or a bare
/// class name.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    geometry: StaticGeometry,
    records: Vec<ElementRecord>,
    container_top: f64,
    cursor: f64,
    width: f64,
    record_height: f64,
    scroll_requests: Vec<f64>,
}

impl MemoryHost {
    /// Empty host with the given viewport; the container starts at `y = 0`
    /// and spans the viewport width.
    pub fn new(viewport: Size) -> Self {
        let mut geometry = StaticGeometry::new(viewport);
        geometry.set_container(Rect::new(0.0, 0.0, viewport.width, 0.0));
        Self {
            geometry,
            records: Vec::new(),
            container_top: 0.0,
            cursor: 0.0,
            width: viewport.width,
            record_height: 100.0,
            scroll_requests: Vec::new(),
        }
    }

    /// Host with one `class` element per height.
    pub fn stacked(class: &str, heights: &[f64], viewport: Size) -> Self {
        let mut host = Self::new(viewport);
        for &h in heights {
            let _ = host.push_element(class, h);
        }
        host
    }

    /// Move the container top down, leaving room for chrome above the first
    /// element. Only valid before any element is pushed.
    pub fn with_container_top(mut self, top: f64) -> Self {
        self.container_top = top;
        self.cursor = top;
        self.sync_container();
        self
    }

    /// Height given to elements created for data records.
    pub fn with_record_height(mut self, height: f64) -> Self {
        self.record_height = height;
        self
    }

    /// Append an element of `height` below the current content.
    pub fn push_element(&mut self, class: &str, height: f64) -> ElementKey {
        let key = ElementKey(self.records.len() as u64);
        self.geometry.set_element(
            key,
            Rect::from_origin_size(Point::new(0.0, self.cursor), Size::new(self.width, height)),
        );
        self.cursor += height;
        self.records.push(ElementRecord {
            class: class.to_owned(),
            id: None,
            attributes: Map::new(),
        });
        self.sync_container();
        key
    }

    /// Give an element an id attribute.
    pub fn set_element_id(&mut self, element: ElementKey, id: impl Into<String>) {
        if let Some(record) = self.record_mut(element) {
            record.id = Some(id.into());
        }
    }

    /// Attach a key/value attribute to an element.
    pub fn set_attribute(&mut self, element: ElementKey, name: impl Into<String>, value: Value) {
        if let Some(record) = self.record_mut(element) {
            record.attributes.insert(name.into(), value);
        }
    }

    /// Change an element's height and restack everything below it.
    pub fn set_element_height(&mut self, element: ElementKey, height: f64) {
        let Ok(target) = usize::try_from(element.0) else {
            return;
        };
        let mut y = self.container_top;
        for i in 0..self.records.len() {
            let key = ElementKey(i as u64);
            let h = if i == target {
                height
            } else {
                self.geometry.element_bounds(key).map_or(0.0, |r| r.height())
            };
            self.geometry.set_element(
                key,
                Rect::from_origin_size(Point::new(0.0, y), Size::new(self.width, h)),
            );
            y += h;
        }
        self.cursor = y;
        self.sync_container();
    }

    /// Scroll vertically, as a user would.
    pub fn set_scroll_top(&mut self, top: f64) {
        self.geometry.set_scroll_top(top);
    }

    /// Resize the viewport. Element widths are left alone.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.geometry.set_viewport_size(size);
    }

    /// Positions passed to [`Host::scroll_to`], oldest first.
    pub fn scroll_requests(&self) -> &[f64] {
        &self.scroll_requests
    }

    fn record_mut(&mut self, element: ElementKey) -> Option<&mut ElementRecord> {
        usize::try_from(element.0)
            .ok()
            .and_then(|i| self.records.get_mut(i))
    }

    fn sync_container(&mut self) {
        self.geometry
            .set_container(Rect::new(0.0, self.container_top, self.width, self.cursor));
    }
}

impl GeometryProvider for MemoryHost {
    fn element_bounds(&self, element: ElementKey) -> Option<Rect> {
        self.geometry.element_bounds(element)
    }

    fn container_bounds(&self) -> Rect {
        self.geometry.container_bounds()
    }

    fn scroll_offset(&self) -> Vec2 {
        self.geometry.scroll_offset()
    }

    fn viewport_size(&self) -> Size {
        self.geometry.viewport_size()
    }
}

impl Host for MemoryHost {
    fn select(&self, selector: &str) -> Vec<ElementKey> {
        let selector = selector.trim();
        let matches = |record: &ElementRecord| match selector.strip_prefix('#') {
            Some(id) => record.id.as_deref() == Some(id),
            None => record.class == selector.strip_prefix('.').unwrap_or(selector),
        };
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| matches(record))
            .map(|(i, _)| ElementKey(i as u64))
            .collect()
    }

    fn element_id(&self, element: ElementKey) -> Option<String> {
        usize::try_from(element.0)
            .ok()
            .and_then(|i| self.records.get(i))
            .and_then(|record| record.id.clone())
    }

    fn attributes(&self, element: ElementKey) -> Map<String, Value> {
        usize::try_from(element.0)
            .ok()
            .and_then(|i| self.records.get(i))
            .map(|record| record.attributes.clone())
            .unwrap_or_default()
    }

    fn create_element(&mut self, class: &str, _data: &Map<String, Value>) -> ElementKey {
        let height = self.record_height;
        self.push_element(class, height)
    }

    fn scroll_to(&mut self, y: f64) {
        let y = y.max(0.0);
        self.scroll_requests.push(y);
        self.geometry.set_scroll_top(y);
    }
}
