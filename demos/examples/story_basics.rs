// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll through a three-item story and print every state notification.
//!
//! Run:
//! - `cargo run -p scrollstory_demos --example story_basics`
//! - `RUST_LOG=scrollstory=debug cargo run -p scrollstory_demos --example story_basics`

use kurbo::Size;
use scrollstory::{Content, EventKind, MemoryHost, Notification, Options, ScrollStory};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn print(n: &Notification) {
    match (&n.item, &n.category) {
        (Some(item), _) => println!("  {:<18} {} (index {})", n.kind, item.id, item.index),
        (None, Some(category)) => println!("  {:<18} {category}", n.kind),
        (None, None) => println!("  {}", n.kind),
    }
}

fn main() -> Result<(), scrollstory::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut host = MemoryHost::stacked("story", &[200.0, 200.0, 200.0], Size::new(400.0, 300.0));
    for (i, category) in ["prologue", "chapter", "chapter"].into_iter().enumerate() {
        host.set_attribute(scrollstory::ElementKey(i as u64), "category", json!(category));
    }
    let options = Options {
        debug: true,
        ..Options::default()
    };
    let mut story = ScrollStory::new(host, Content::Default, options)?;
    for kind in [
        EventKind::ItemFocus,
        EventKind::ItemBlur,
        EventKind::CategoryFocus,
        EventKind::CategoryBlur,
        EventKind::ContainerActive,
        EventKind::ContainerInactive,
    ] {
        let _ = story.on(kind, print);
    }

    // One scroll signal every 120ms so each one passes the throttle.
    for (step, top) in [0.0, 150.0, 250.0, 450.0, 650.0, 100.0].into_iter().enumerate() {
        println!("scroll_top = {top}");
        story.host_mut().set_scroll_top(top);
        story.scroll(step as u64 * 120);
        let c = story.container();
        println!(
            "  -> active {:?}, {:.0}% scrolled, last-item progress {:.2}",
            story.index(),
            c.percent_scrolled * 100.0,
            c.last_item_progress
        );
    }
    Ok(())
}
