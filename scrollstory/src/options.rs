// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Story configuration.
//!
//! ```
//! use scrollstory::{ActivationPolicy, Offset, Options};
//!
//! let options = Options::from_json(
//!     r#"{ "triggerOffset": "25%", "activationPolicy": "nearest", "keyboard": false }"#,
//! )
//! .unwrap();
//! assert_eq!(options.trigger_offset, Offset::Percent(25.0));
//! assert_eq!(options.activation_policy, ActivationPolicy::Nearest);
//! assert!(!options.keyboard);
//! assert_eq!(options.scroll_sensitivity, 100, "missing keys keep their defaults");
//! ```

use scrollstory_items::{Error, Offset, Result};
use scrollstory_layout::{ActivationPolicy, AreaBoundary};
use serde::Deserialize;

use crate::events::Callbacks;
use crate::schedule::{ThrottleOptions, ThrottleType};

/// Every recognized option. Field names deserialize in camelCase.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Selector used when the story is built from [`Content::Default`](crate::Content::Default),
    /// and whose class is given to elements created for data records.
    pub content_selector: String,
    /// Trigger line, measured down from the viewport top.
    pub trigger_offset: Offset,
    /// Space left above an item when scrolling to it.
    pub scroll_offset: Offset,
    /// Activate the first unfiltered item when nothing else would be active.
    pub auto_activate_first_item: bool,
    /// Deactivate everything once the container has scrolled past the trigger.
    pub disable_past_last_item: bool,
    /// How scroll signals are limited.
    pub throttle_type: ThrottleType,
    /// Scroll limiter window in milliseconds.
    pub scroll_sensitivity: u64,
    /// Which throttle edges fire.
    pub throttle_options: ThrottleOptions,
    /// Left/right keys move to the previous/next item.
    pub keyboard: bool,
    /// Scroll processing on or off.
    pub enabled: bool,
    /// How the active candidate is selected.
    pub activation_policy: ActivationPolicy,
    /// Boundary rule for the container's active area.
    pub area_boundary: AreaBoundary,
    /// Re-read geometry after a resize settles.
    pub update_offsets_on_resize: bool,
    /// Resize debounce window in milliseconds.
    pub resize_sensitivity: u64,
    /// Prefix for generated item ids.
    pub id_prefix: String,
    /// Log the trigger line position after each offset refresh.
    pub debug: bool,
    /// Per-notification callbacks and the item build hook.
    #[serde(skip)]
    pub callbacks: Callbacks,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            content_selector: ".story".into(),
            trigger_offset: Offset::Pixels(0.0),
            scroll_offset: Offset::Pixels(0.0),
            auto_activate_first_item: false,
            disable_past_last_item: true,
            throttle_type: ThrottleType::Throttle,
            scroll_sensitivity: 100,
            throttle_options: ThrottleOptions::default(),
            keyboard: true,
            enabled: true,
            activation_policy: ActivationPolicy::Crossed,
            area_boundary: AreaBoundary::HalfOpen,
            update_offsets_on_resize: true,
            resize_sensitivity: 100,
            id_prefix: "story".into(),
            debug: false,
            callbacks: Callbacks::default(),
        }
    }
}

impl Options {
    /// Parse options from JSON. Unknown keys are ignored.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidArgument(e.to_string()))
    }

    /// Replace the callbacks.
    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Class name derived from `content_selector`, without a leading `.`.
    pub(crate) fn content_class(&self) -> &str {
        self.content_selector
            .strip_prefix('.')
            .unwrap_or(&self.content_selector)
    }
}
