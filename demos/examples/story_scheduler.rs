// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive a story with a simulated clock: a burst of scroll signals, then a
//! resize that changes the layout.
//!
//! Run:
//! - `cargo run -p scrollstory_demos --example story_scheduler`

use kurbo::Size;
use scrollstory::{Content, ElementKey, EventKind, MemoryHost, Options, ScrollStory};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), scrollstory::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = Options::from_json(
        r#"{
            "triggerOffset": "20%",
            "scrollSensitivity": 100,
            "throttleOptions": { "leading": true, "trailing": true },
            "resizeSensitivity": 150
        }"#,
    )?;
    let host = MemoryHost::stacked("story", &[300.0; 5], Size::new(400.0, 500.0));
    let mut story = ScrollStory::new(host, Content::Default, options)?;
    for kind in [
        EventKind::ContainerScroll,
        EventKind::ContainerResize,
        EventKind::UpdateOffsets,
        EventKind::ItemFocus,
    ] {
        let _ = story.on(kind, |n| info!(kind = %n.kind, item = ?n.item.as_ref().map(|i| i.index)));
    }

    // A signal every 16ms for half a second, scrolling 12px per frame.
    let mut now = 0;
    let mut top = 0.0;
    while now <= 500 {
        top += 12.0;
        story.host_mut().set_scroll_top(top);
        story.scroll(now);
        story.tick(now);
        now += 16;
    }
    if let Some(deadline) = story.next_deadline() {
        story.tick(deadline);
    }
    info!(active = ?story.index(), top, "after scrolling");

    // The first item grows; nothing changes until the resize settles.
    story.host_mut().set_element_height(ElementKey(0), 900.0);
    story.resize(1_000);
    story.resize(1_040);
    story.tick(1_100);
    info!(active = ?story.index(), "resize pending");
    story.tick(1_190);
    info!(active = ?story.index(), "resize settled");
    Ok(())
}
