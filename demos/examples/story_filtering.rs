// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a story from data records, query it, filter by tag, and navigate with
//! the keyboard.
//!
//! Run:
//! - `cargo run -p scrollstory_demos --example story_filtering`

use kurbo::Size;
use scrollstory::{Content, EventKind, Key, MemoryHost, Options, ScrollStory, TagMatch, Where};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

fn records() -> Vec<Map<String, Value>> {
    [
        json!({ "id": "harbor", "category": "coast", "tags": "water, boats" }),
        json!({ "category": "coast", "tags": ["water"] }),
        json!({ "category": "hills", "tags": "walk" }),
        json!({ "category": "hills", "tags": "walk, boats", "scrollOffset": "10%" }),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect()
}

fn main() -> Result<(), scrollstory::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host = MemoryHost::new(Size::new(400.0, 300.0)).with_record_height(250.0);
    let mut story = ScrollStory::new(host, Content::Records(records()), Options::default())?;
    let _ = story.on(EventKind::ItemFocus, |n| {
        if let Some(item) = &n.item {
            println!("  focus {} [{}]", item.id, item.category.as_deref().unwrap_or("-"));
        }
    });
    let _ = story.on(EventKind::ItemFilter, |n| {
        if let Some(item) = &n.item {
            println!("  filtered {}", item.id);
        }
    });

    println!("categories: {:?}", story.categories());
    println!("tags: {:?}", story.tags());
    let hills: Vec<_> = story
        .items_where(&Where::new().eq("category", "hills"))
        .iter()
        .map(|i| i.id.clone())
        .collect();
    println!("hills: {hills:?}");

    println!("right, right:");
    let _ = story.handle_key(Key::Right);
    let _ = story.handle_key(Key::Right);

    println!("filter everything tagged water:");
    story.filter_by_tag(&["water"], TagMatch::Any);
    story.repaint();
    println!("  active now {:?}", story.active_item().map(|i| &i.id));

    println!("jump to the hills:");
    let _ = story.scroll_to_category("hills");
    println!("  scroll requests so far: {:?}", story.host().scroll_requests());
    Ok(())
}
