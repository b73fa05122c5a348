// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry capability and a synthetic implementation of it.

use std::collections::HashMap;

use kurbo::{Point, Rect, Size, Vec2};
use scrollstory_items::ElementKey;

/// Read access to the host's layout.
///
/// All rectangles are in document space: `y = 0` is the top of the
/// scrollable document, not the top of the viewport. The offset cache is the
/// only consumer of [`element_bounds`](Self::element_bounds) and
/// [`container_bounds`](Self::container_bounds); scroll and viewport reads
/// happen once per repaint.
pub trait GeometryProvider {
    /// Bounds of the element backing an item, or `None` if the host no
    /// longer knows the element.
    fn element_bounds(&self, element: ElementKey) -> Option<Rect>;

    /// Bounds of the story container.
    fn container_bounds(&self) -> Rect;

    /// Current scroll offset of the document.
    fn scroll_offset(&self) -> Vec2;

    /// Size of the visible viewport.
    fn viewport_size(&self) -> Size;

    /// Visible document rectangle.
    fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(self.scroll_offset().to_point(), self.viewport_size())
    }
}

/// In-memory geometry: a fixed set of element rectangles plus a scroll
/// position you move by hand.
///
/// Useful for headless hosts and as a test fixture.
#[derive(Clone, Debug, Default)]
pub struct StaticGeometry {
    elements: HashMap<ElementKey, Rect>,
    container: Rect,
    scroll: Vec2,
    viewport: Size,
}

impl StaticGeometry {
    /// Empty geometry with the given viewport size.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Elements `0..heights.len()` stacked without gaps from `top`, with the
    /// container wrapping them exactly.
    pub fn stacked(top: f64, width: f64, heights: &[f64], viewport: Size) -> Self {
        let mut geometry = Self::new(viewport);
        let mut y = top;
        for (i, &h) in heights.iter().enumerate() {
            geometry.set_element(
                ElementKey(i as u64),
                Rect::from_origin_size(Point::new(0.0, y), Size::new(width, h)),
            );
            y += h;
        }
        geometry.set_container(Rect::new(0.0, top, width, y));
        geometry
    }

    /// Set or replace an element's bounds.
    pub fn set_element(&mut self, element: ElementKey, bounds: Rect) {
        self.elements.insert(element, bounds);
    }

    /// Forget an element.
    pub fn remove_element(&mut self, element: ElementKey) {
        self.elements.remove(&element);
    }

    /// Set the container bounds.
    pub fn set_container(&mut self, bounds: Rect) {
        self.container = bounds;
    }

    /// Scroll vertically to `top`.
    pub fn set_scroll_top(&mut self, top: f64) {
        self.scroll.y = top;
    }

    /// Set the full scroll offset.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
    }

    /// Resize the viewport.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }
}

impl GeometryProvider for StaticGeometry {
    fn element_bounds(&self, element: ElementKey) -> Option<Rect> {
        self.elements.get(&element).copied()
    }

    fn container_bounds(&self) -> Rect {
        self.container
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_elements_have_no_gaps() {
        let g = StaticGeometry::stacked(50.0, 300.0, &[100.0, 200.0], Size::new(300.0, 400.0));
        assert_eq!(
            g.element_bounds(ElementKey(0)),
            Some(Rect::new(0.0, 50.0, 300.0, 150.0))
        );
        assert_eq!(
            g.element_bounds(ElementKey(1)),
            Some(Rect::new(0.0, 150.0, 300.0, 350.0))
        );
        assert_eq!(g.container_bounds(), Rect::new(0.0, 50.0, 300.0, 350.0));
    }

    #[test]
    fn viewport_rect_follows_scroll() {
        let mut g = StaticGeometry::new(Size::new(800.0, 600.0));
        g.set_scroll_top(250.0);
        assert_eq!(g.viewport_rect(), Rect::new(0.0, 250.0, 800.0, 850.0));
    }
}
