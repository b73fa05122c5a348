// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a story over an in-memory host.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use scrollstory::{
    ActivationPolicy, Content, ElementKey, EventKind, GeometryProvider, Host, MemoryHost,
    Notification, Options, ScrollStory, ThrottleType,
};
use serde_json::{Map, Value, json};

type Log = Rc<RefCell<Vec<String>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn describe(n: &Notification) -> String {
    match (&n.item, &n.category) {
        (Some(item), _) => format!("{}:{}", n.kind, item.index),
        (None, Some(category)) => format!("{}:{category}", n.kind),
        (None, None) => n.kind.to_string(),
    }
}

fn log_all(story: &mut ScrollStory<MemoryHost>, kinds: &[EventKind]) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for &kind in kinds {
        let l = log.clone();
        let _ = story.on(kind, move |n| l.borrow_mut().push(describe(n)));
    }
    log
}

const STATE_KINDS: [EventKind; 6] = [
    EventKind::ItemFocus,
    EventKind::ItemBlur,
    EventKind::CategoryFocus,
    EventKind::CategoryBlur,
    EventKind::ContainerActive,
    EventKind::ContainerInactive,
];

fn scroll_to(story: &mut ScrollStory<MemoryHost>, top: f64) {
    story.host_mut().set_scroll_top(top);
    story.repaint();
}

fn active_count(story: &ScrollStory<MemoryHost>) -> usize {
    story.items().iter().filter(|i| i.is_active()).count()
}

// Three 200px items from y = 0, trigger at the viewport top. The story starts
// disabled so the initial activation is observed too.
#[test]
fn end_to_end_three_items() {
    init_tracing();
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let options = Options {
        enabled: false,
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    assert_eq!(story.index(), None);
    let log = log_all(&mut story, &STATE_KINDS);
    story.enable();

    let mut seen = vec![story.index()];
    for top in 0..=850 {
        scroll_to(&mut story, f64::from(top));
        if seen.last() != Some(&story.index()) {
            seen.push(story.index());
        }
    }
    assert_eq!(seen, vec![None, Some(0), Some(1), Some(2), None]);

    assert_eq!(
        *log.borrow(),
        vec![
            "itemfocus:0",
            "containeractive",
            "itemblur:0",
            "itemfocus:1",
            "itemblur:1",
            "itemfocus:2",
            "itemblur:2",
            "containerinactive",
        ]
    );
}

// The exact scroll positions of each transition with the container at y = 0.
#[test]
fn end_to_end_transition_points() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let cases = [
        (0.0, Some(0)),
        (199.0, Some(0)),
        (200.0, Some(1)),
        (399.0, Some(1)),
        // Flooring: 0.5px short of the line already counts as crossed.
        (399.5, Some(2)),
        (400.0, Some(2)),
        (599.0, Some(2)),
        (600.0, None),
        (650.0, None),
    ];
    for (top, expected) in cases {
        scroll_to(&mut story, top);
        assert_eq!(story.index(), expected, "at scroll_top {top}");
    }
}

#[test]
fn past_last_item_stays_active_when_allowed() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let options = Options {
        disable_past_last_item: false,
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    scroll_to(&mut story, 900.0);
    assert_eq!(story.index(), Some(2));
}

#[test]
fn auto_activate_first_item_before_crossing() {
    let mut host = MemoryHost::new(Size::new(320.0, 300.0)).with_container_top(500.0);
    for _ in 0..2 {
        let _ = host.push_element("story", 100.0);
    }
    let options = Options {
        auto_activate_first_item: true,
        ..Options::default()
    };
    let story = ScrollStory::new(host, Content::Default, options).unwrap();
    assert_eq!(story.index(), Some(0));
    assert!(story.is_container_active());
}

// Items at [100, 300, 500], trigger 0.
#[test]
fn crossing_selection() {
    let mut host = MemoryHost::new(Size::new(320.0, 300.0)).with_container_top(100.0);
    for _ in 0..3 {
        let _ = host.push_element("story", 200.0);
    }
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let tops: Vec<_> = story.items().iter().map(|i| i.geometry.top_offset).collect();
    assert_eq!(tops, vec![100.0, 300.0, 500.0]);

    scroll_to(&mut story, 350.0);
    assert_eq!(story.index(), Some(1));
    scroll_to(&mut story, 50.0);
    assert_eq!(story.index(), None);
}

// Two items share a top offset; the lower index wins.
#[derive(Debug)]
struct Overlapping(MemoryHost);

impl GeometryProvider for Overlapping {
    fn element_bounds(&self, element: ElementKey) -> Option<Rect> {
        match element.0 {
            0 | 1 => Some(Rect::from_origin_size(Point::new(0.0, 0.0), Size::new(320.0, 100.0))),
            _ => self.0.element_bounds(element),
        }
    }
    fn container_bounds(&self) -> Rect {
        self.0.container_bounds()
    }
    fn scroll_offset(&self) -> kurbo::Vec2 {
        self.0.scroll_offset()
    }
    fn viewport_size(&self) -> Size {
        self.0.viewport_size()
    }
}

impl Host for Overlapping {
    fn select(&self, selector: &str) -> Vec<ElementKey> {
        self.0.select(selector)
    }
    fn element_id(&self, element: ElementKey) -> Option<String> {
        self.0.element_id(element)
    }
    fn attributes(&self, element: ElementKey) -> Map<String, Value> {
        self.0.attributes(element)
    }
    fn create_element(&mut self, class: &str, data: &Map<String, Value>) -> ElementKey {
        self.0.create_element(class, data)
    }
    fn scroll_to(&mut self, y: f64) {
        self.0.scroll_to(y);
    }
}

#[test]
fn tie_break_prefers_lower_index() {
    for policy in [ActivationPolicy::Crossed, ActivationPolicy::Nearest] {
        let inner = MemoryHost::stacked("story", &[100.0, 100.0, 100.0], Size::new(320.0, 300.0));
        let options = Options {
            activation_policy: policy,
            ..Options::default()
        };
        let mut story = ScrollStory::new(Overlapping(inner), Content::Default, options).unwrap();
        story.host_mut().0.set_scroll_top(50.0);
        story.repaint();
        assert_eq!(story.index(), Some(0), "{policy:?}");
    }
}

// Filtering the active item blurs it, and no later repaint selects it.
#[test]
fn filter_exclusion() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    scroll_to(&mut story, 250.0);
    assert_eq!(story.index(), Some(1));

    let log = log_all(&mut story, &[EventKind::ItemBlur, EventKind::ItemFilter]);
    assert!(story.filter("story-1"));
    assert_eq!(*log.borrow(), vec!["itemblur:1", "itemfilter:1"]);
    assert_eq!(story.index(), None);
    assert!(story.is_container_active(), "container settles on the next repaint");

    for top in [250.0, 300.0, 399.0] {
        scroll_to(&mut story, top);
        assert_ne!(story.index(), Some(1));
        assert!(!story.item_by_index(1).unwrap().is_active());
    }
    // The item before it is the most recent unfiltered crossing.
    assert_eq!(story.index(), Some(0));

    assert!(story.unfilter("story-1"));
    assert_eq!(story.index(), Some(0), "unfilter does not activate");
    story.repaint();
    assert_eq!(story.index(), Some(1));
}

#[test]
fn percent_complete_boundaries() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    for (top, expected) in [(200.0, 0.0), (300.0, 0.5), (400.0, 1.0), (500.0, 1.0)] {
        scroll_to(&mut story, top);
        assert_eq!(
            story.item_by_index(1).unwrap().percent_scroll_complete,
            expected,
            "at scroll_top {top}"
        );
    }
}

#[test]
fn update_offsets_is_idempotent() {
    let host = MemoryHost::stacked("story", &[120.0, 80.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let before: Vec<_> = story.items().iter().map(|i| i.geometry).collect();
    let damage = story.update_offsets();
    let after: Vec<_> = story.items().iter().map(|i| i.geometry).collect();
    assert!(damage.is_empty());
    assert_eq!(before, after);
}

// A ("x") -> B ("y") -> C ("y").
#[test]
fn category_transitions() {
    let mut host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    for (i, category) in ["x", "y", "y"].into_iter().enumerate() {
        host.set_attribute(ElementKey(i as u64), "category", json!(category));
    }
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let log = log_all(&mut story, &[EventKind::CategoryFocus, EventKind::CategoryBlur]);

    scroll_to(&mut story, 200.0);
    assert_eq!(*log.borrow(), vec!["categoryblur:x", "categoryfocus:y"]);
    log.borrow_mut().clear();

    scroll_to(&mut story, 400.0);
    assert!(log.borrow().is_empty(), "same category, no edges");
    assert_eq!(story.active_category(), Some("y"));
    assert_eq!(story.categories(), &["x", "y"]);
}

// Random walk over scroll positions and filter operations.
#[test]
fn at_most_one_active() {
    let heights = [150.0, 90.0, 300.0, 60.0, 200.0];
    let host = MemoryHost::stacked("story", &heights, Size::new(320.0, 300.0));
    let options = Options {
        activation_policy: ActivationPolicy::Nearest,
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let id = format!("story-{}", seed % 5);
        match seed % 4 {
            0 => {
                let _ = story.filter(&id);
            }
            1 => {
                let _ = story.unfilter(&id);
            }
            _ => scroll_to(&mut story, (seed % 900) as f64),
        }
        assert!(active_count(&story) <= 1);
        if let Some(active) = story.active_item() {
            assert!(!active.is_filtered());
        }
    }
}

#[test]
fn viewport_notifications() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let in_view: Vec<_> = story.items_in_viewport().iter().map(|i| i.index).collect();
    assert_eq!(in_view, vec![0, 1]);

    let log = log_all(
        &mut story,
        &[EventKind::ItemEnterViewport, EventKind::ItemExitViewport],
    );
    scroll_to(&mut story, 250.0);
    assert_eq!(
        *log.borrow(),
        vec!["itemexitviewport:0", "itementerviewport:2"]
    );
}

// Throttled scroll signals collapse; the trailing edge arrives from tick.
#[test]
fn scheduled_scroll_and_resize() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let log = log_all(
        &mut story,
        &[
            EventKind::ContainerScroll,
            EventKind::ContainerResize,
            EventKind::UpdateOffsets,
        ],
    );

    story.host_mut().set_scroll_top(100.0);
    story.scroll(1_000);
    story.host_mut().set_scroll_top(250.0);
    story.scroll(1_020);
    assert_eq!(story.index(), Some(0), "second signal was throttled");
    assert_eq!(story.next_deadline(), Some(1_100));
    story.tick(1_100);
    assert_eq!(story.index(), Some(1));

    // The first item grows; the resize settles and refreshes offsets.
    story.host_mut().set_element_height(ElementKey(0), 400.0);
    story.resize(2_000);
    story.resize(2_050);
    story.tick(2_100);
    assert_eq!(story.index(), Some(1), "resize still debouncing");
    story.tick(2_150);
    assert_eq!(story.index(), Some(0));

    assert_eq!(
        *log.borrow(),
        vec![
            "containerscroll",
            "containerscroll",
            "updateoffsets",
            "containerresize",
        ]
    );
}

#[test]
fn debounced_scroll() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0], Size::new(320.0, 300.0));
    let options = Options {
        throttle_type: ThrottleType::Debounce,
        scroll_sensitivity: 50,
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    story.host_mut().set_scroll_top(250.0);
    story.scroll(0);
    story.scroll(30);
    story.tick(60);
    assert_eq!(story.index(), Some(0));
    story.tick(80);
    assert_eq!(story.index(), Some(1));
}

#[test]
fn options_from_json_drive_the_story() {
    let options = Options::from_json(r#"{ "triggerOffset": "50%", "idPrefix": "part" }"#).unwrap();
    let host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    // Trigger line 150px down: item 1 (top 200) crosses at scroll_top 50.
    scroll_to(&mut story, 50.0);
    assert_eq!(story.active_item().map(|i| i.id.as_str()), Some("part-1"));
}

#[test]
fn records_become_items() {
    let records: Vec<Map<String, Value>> = [
        json!({ "title": "One", "tags": ["intro"] }),
        json!({ "title": "Two", "tags": "body, late" }),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect();
    let host = MemoryHost::new(Size::new(320.0, 300.0)).with_record_height(150.0);
    let story = ScrollStory::new(host, Content::Records(records), Options::default()).unwrap();
    assert_eq!(story.len(), 2);
    assert_eq!(story.tags(), &["intro", "body", "late"]);
    assert_eq!(
        story.item_by_id("story-1").and_then(|i| i.data.get("title")),
        Some(&json!("Two"))
    );
    assert_eq!(story.host().select(".story").len(), 2);
}

// `triggerOffset: false` on an element means "use the global trigger".
#[test]
fn false_offset_attribute_uses_global() {
    let mut host = MemoryHost::stacked("story", &[200.0, 200.0], Size::new(320.0, 300.0));
    host.set_attribute(ElementKey(1), "triggerOffset", json!(false));
    host.set_attribute(ElementKey(1), "scrollOffset", json!(false));
    let options = Options {
        trigger_offset: scrollstory::Offset::Pixels(50.0),
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options).unwrap();
    let item = story.item_by_index(1).unwrap();
    assert_eq!(item.trigger_offset, None);
    assert_eq!(item.scroll_offset, None);

    scroll_to(&mut story, 150.0);
    assert_eq!(story.index(), Some(1), "item 1 crosses the global trigger at 150");
}

// A failing batch adds nothing, emits nothing and creates no host elements.
#[test]
fn failed_add_items_leaves_story_untouched() {
    let host = MemoryHost::stacked("story", &[200.0, 200.0], Size::new(320.0, 300.0));
    let mut story = ScrollStory::new(host, Content::Default, Options::default()).unwrap();
    let log = log_all(&mut story, &[EventKind::ItemBuild, EventKind::UpdateOffsets]);

    let records: Vec<Map<String, Value>> = [json!({ "title": "Three" }), json!({ "id": 5 })]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
    let err = story.add_items(Content::Records(records)).unwrap_err();
    assert!(matches!(err, scrollstory::Error::InvalidArgument(_)));
    assert_eq!(story.len(), 2);
    assert!(story.item_by_id("story-2").is_none());
    assert!(log.borrow().is_empty(), "{:?}", log.borrow());
    assert_eq!(story.host().select(".story").len(), 2);

    // A duplicate against existing content fails the same way.
    let mut host = story.host().clone();
    let extra = host.push_element("story", 100.0);
    host.set_element_id(extra, "story-0");
    *story.host_mut() = host;
    assert!(story.add_items(Content::Elements(vec![extra])).is_err());
    assert_eq!(story.len(), 2);
    assert!(log.borrow().is_empty(), "{:?}", log.borrow());
}

// Nearest activates ahead of the trigger, but only inside the container's
// active area unless past-last-item deactivation is off.
#[test]
fn nearest_policy_and_active_area() {
    let build = |disable_past_last_item| {
        let mut host = MemoryHost::new(Size::new(320.0, 300.0)).with_container_top(100.0);
        for _ in 0..3 {
            let _ = host.push_element("story", 200.0);
        }
        let options = Options {
            activation_policy: ActivationPolicy::Nearest,
            disable_past_last_item,
            ..Options::default()
        };
        ScrollStory::new(host, Content::Default, options).unwrap()
    };

    let mut story = build(true);
    assert_eq!(story.index(), None, "container top has not reached the trigger");
    scroll_to(&mut story, 250.0);
    assert_eq!(story.index(), Some(1), "item 1 is 50px below the trigger");

    let mut story = build(false);
    assert_eq!(story.index(), Some(0));
    scroll_to(&mut story, 250.0);
    assert_eq!(story.index(), Some(1));
}
