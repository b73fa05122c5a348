// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-item state machine: compute focus, blur, category and container
//! transitions from resolved candidates and filter operations.
//!
//! ## Usage
//!
//! 1) Resolve positions with [`Resolver`](scrollstory_layout::Resolver) to get
//!    a candidate and the container's active-area flag.
//! 2) Call [`ActiveState::apply`] with both to get the transitions.
//! 3) Turn each [`Transition`] into a notification.
//!
//! ```
//! use scrollstory::state::{ActivationRules, ActiveState, Transition};
//! use scrollstory_items::{ElementKey, ItemDraft, ItemStore};
//!
//! let mut store = ItemStore::new();
//! for i in 0..2 {
//!     store.add_item(ItemDraft::new(ElementKey(i)), |_| {}).unwrap();
//! }
//! let mut state = ActiveState::new(ActivationRules::default());
//! assert_eq!(
//!     state.apply(&mut store, Some(0), true),
//!     vec![Transition::ItemFocus(0), Transition::ContainerActive],
//! );
//! assert_eq!(
//!     state.apply(&mut store, Some(1), true),
//!     vec![Transition::ItemBlur(0), Transition::ItemFocus(1)],
//! );
//! ```

use scrollstory_items::{ItemFlags, ItemStore};
use tracing::debug;

/// Policies applied on top of the resolver's candidate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActivationRules {
    /// With no candidate left, activate the first unfiltered item.
    pub auto_activate_first_item: bool,
    /// Outside the container's active area, nothing is active.
    pub disable_past_last_item: bool,
}

impl Default for ActivationRules {
    fn default() -> Self {
        Self {
            auto_activate_first_item: false,
            disable_past_last_item: true,
        }
    }
}

/// A state transition, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Item at this index lost focus.
    ItemBlur(usize),
    /// Item at this index gained focus.
    ItemFocus(usize),
    /// This category stopped being the active one.
    CategoryBlur(String),
    /// This category became the active one.
    CategoryFocus(String),
    /// First item activated while the container was inactive.
    ContainerActive,
    /// Last active item deactivated.
    ContainerInactive,
    /// Item at this index was filtered.
    ItemFilter(usize),
    /// Item at this index was unfiltered.
    ItemUnfilter(usize),
}

/// Tracks the active item, the active category, the container's active
/// state, and the blur history.
///
/// Ordering semantics for one change of active item:
/// - `ItemBlur(old)` then `ItemFocus(new)`.
/// - `CategoryBlur(old)` then `CategoryFocus(new)`, only if the category
///   changed.
/// - `ContainerActive` / `ContainerInactive` last, only on edges.
#[derive(Clone, Debug, Default)]
pub struct ActiveState {
    rules: ActivationRules,
    active: Option<usize>,
    container_active: bool,
    category: Option<String>,
    history: Vec<usize>,
}

impl ActiveState {
    /// Fresh state: nothing active.
    pub fn new(rules: ActivationRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Rules in effect.
    pub fn rules(&self) -> ActivationRules {
        self.rules
    }

    /// Index of the active item.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Whether the container is active.
    pub fn container_active(&self) -> bool {
        self.container_active
    }

    /// Category of the active item.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Previously active items, most recent first.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Apply the activation rules to a resolver candidate.
    pub fn decide(
        &self,
        store: &ItemStore,
        candidate: Option<usize>,
        in_active_area: bool,
    ) -> Option<usize> {
        let mut target = candidate;
        if self.rules.disable_past_last_item && !in_active_area {
            target = None;
        }
        if target.is_none() && self.rules.auto_activate_first_item {
            target = store.iter().find(|item| !item.is_filtered()).map(|item| item.index);
        }
        target
    }

    /// Decide and move to the new target, returning the transitions.
    pub fn apply(
        &mut self,
        store: &mut ItemStore,
        candidate: Option<usize>,
        in_active_area: bool,
    ) -> Vec<Transition> {
        let target = self.decide(store, candidate, in_active_area);
        self.move_to(store, target)
    }

    /// Focus `index` directly. No-op if the item is missing, filtered, or
    /// already active.
    pub fn focus(&mut self, store: &mut ItemStore, index: usize) -> Vec<Transition> {
        match store.get_by_index(index) {
            Some(item) if !item.is_filtered() && !item.is_active() => {
                self.move_to(store, Some(index))
            }
            _ => Vec::new(),
        }
    }

    /// Deactivate everything.
    pub fn blur_all(&mut self, store: &mut ItemStore) -> Vec<Transition> {
        self.move_to(store, None)
    }

    /// Mark `index` filtered, blurring it first if it is active.
    ///
    /// The container state and the active category are left alone; the next
    /// [`apply`](Self::apply) settles them.
    pub fn filter(&mut self, store: &mut ItemStore, index: usize) -> Vec<Transition> {
        let mut out = Vec::new();
        let Some(item) = store.get_mut(index) else {
            return out;
        };
        if item.is_filtered() {
            return out;
        }
        if self.active == Some(index) {
            item.set_flags(ItemFlags::ACTIVE, false);
            self.active = None;
            self.history.insert(0, index);
            out.push(Transition::ItemBlur(index));
        }
        item.set_flags(ItemFlags::FILTERED, true);
        out.push(Transition::ItemFilter(index));
        debug!(index, "item filtered");
        out
    }

    /// Clear the filtered flag on `index`. Never activates anything.
    pub fn unfilter(&mut self, store: &mut ItemStore, index: usize) -> Vec<Transition> {
        match store.get_mut(index) {
            Some(item) if item.is_filtered() => {
                item.set_flags(ItemFlags::FILTERED, false);
                debug!(index, "item unfiltered");
                vec![Transition::ItemUnfilter(index)]
            }
            _ => Vec::new(),
        }
    }

    /// Forget everything, without emitting transitions.
    pub fn reset(&mut self) {
        self.active = None;
        self.container_active = false;
        self.category = None;
        self.history.clear();
    }

    fn move_to(&mut self, store: &mut ItemStore, target: Option<usize>) -> Vec<Transition> {
        let mut out = Vec::new();
        if target != self.active {
            if let Some(old) = self.active.take() {
                if let Some(item) = store.get_mut(old) {
                    item.set_flags(ItemFlags::ACTIVE, false);
                }
                self.history.insert(0, old);
                out.push(Transition::ItemBlur(old));
            }
            if let Some(new) = target
                && let Some(item) = store.get_mut(new)
            {
                item.set_flags(ItemFlags::ACTIVE, true);
                self.active = Some(new);
                out.push(Transition::ItemFocus(new));
            }
            debug!(active = ?self.active, "active item changed");
        }

        // Category follows the active item; with nothing active it is kept
        // only while the container still counts as active.
        let category = match self.active {
            Some(index) => store.get_by_index(index).and_then(|item| item.category.clone()),
            None if target.is_none() => None,
            None => self.category.clone(),
        };
        if category != self.category {
            if let Some(old) = self.category.take() {
                out.push(Transition::CategoryBlur(old));
            }
            if let Some(new) = &category {
                out.push(Transition::CategoryFocus(new.clone()));
            }
            self.category = category;
        }

        match (self.active.is_some(), self.container_active) {
            (true, false) => {
                self.container_active = true;
                out.push(Transition::ContainerActive);
            }
            (false, true) => {
                self.container_active = false;
                out.push(Transition::ContainerInactive);
            }
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollstory_items::{ElementKey, ItemDraft};
    use serde_json::json;

    fn store(categories: &[Option<&str>]) -> ItemStore {
        let mut store = ItemStore::new();
        for (i, category) in categories.iter().enumerate() {
            let mut data = serde_json::Map::new();
            if let Some(c) = category {
                data.insert("category".into(), json!(c));
            }
            let draft = ItemDraft::new(ElementKey(i as u64)).with_data(data);
            store.add_item(draft, |_| {}).unwrap();
        }
        store
    }

    fn active_count(store: &ItemStore) -> usize {
        store.iter().filter(|i| i.is_active()).count()
    }

    // Same candidate twice: no transitions the second time.
    #[test]
    fn same_candidate_is_silent() {
        let mut s = store(&[None, None]);
        let mut state = ActiveState::new(ActivationRules::default());
        let _ = state.apply(&mut s, Some(0), true);
        assert!(state.apply(&mut s, Some(0), true).is_empty());
        assert_eq!(active_count(&s), 1);
    }

    // A -> B across categories, then B -> C within the same one.
    #[test]
    fn category_edges() {
        let mut s = store(&[Some("x"), Some("y"), Some("y")]);
        let mut state = ActiveState::new(ActivationRules::default());
        assert_eq!(
            state.apply(&mut s, Some(0), true),
            vec![
                Transition::ItemFocus(0),
                Transition::CategoryFocus("x".into()),
                Transition::ContainerActive,
            ]
        );
        assert_eq!(
            state.apply(&mut s, Some(1), true),
            vec![
                Transition::ItemBlur(0),
                Transition::ItemFocus(1),
                Transition::CategoryBlur("x".into()),
                Transition::CategoryFocus("y".into()),
            ]
        );
        assert_eq!(
            state.apply(&mut s, Some(2), true),
            vec![Transition::ItemBlur(1), Transition::ItemFocus(2)]
        );
        assert_eq!(state.category(), Some("y"));
        assert_eq!(state.history(), &[1, 0]);
    }

    #[test]
    fn leaving_active_area_deactivates_container() {
        let mut s = store(&[Some("x")]);
        let mut state = ActiveState::new(ActivationRules::default());
        let _ = state.apply(&mut s, Some(0), true);
        assert_eq!(
            state.apply(&mut s, Some(0), false),
            vec![
                Transition::ItemBlur(0),
                Transition::CategoryBlur("x".into()),
                Transition::ContainerInactive,
            ]
        );
        assert!(!state.container_active());
        assert_eq!(active_count(&s), 0);
    }

    #[test]
    fn past_last_item_rule_can_be_disabled() {
        let s = store(&[None]);
        let rules = ActivationRules {
            disable_past_last_item: false,
            ..ActivationRules::default()
        };
        let state = ActiveState::new(rules);
        assert_eq!(state.decide(&s, Some(0), false), Some(0));
    }

    // Auto-activation picks the first unfiltered item, after the past-last rule.
    #[test]
    fn auto_activate_first_unfiltered() {
        let mut s = store(&[None, None]);
        let rules = ActivationRules {
            auto_activate_first_item: true,
            disable_past_last_item: true,
        };
        let mut state = ActiveState::new(rules);
        let _ = state.filter(&mut s, 0);
        assert_eq!(state.decide(&s, None, false), Some(1));
        assert_eq!(state.decide(&s, Some(0), false), Some(1));
    }

    // Filtering the active item blurs it but keeps the container active.
    #[test]
    fn filter_active_item() {
        let mut s = store(&[Some("x"), Some("x")]);
        let mut state = ActiveState::new(ActivationRules::default());
        let _ = state.apply(&mut s, Some(0), true);
        assert_eq!(
            state.filter(&mut s, 0),
            vec![Transition::ItemBlur(0), Transition::ItemFilter(0)]
        );
        assert!(state.container_active());
        assert_eq!(state.active(), None);
        assert!(state.filter(&mut s, 0).is_empty(), "already filtered");

        // Focus guard: a filtered item cannot be focused.
        assert!(state.focus(&mut s, 0).is_empty());

        // Next repaint with another item in the same category: no category edge.
        assert_eq!(
            state.apply(&mut s, Some(1), true),
            vec![Transition::ItemFocus(1)]
        );

        assert_eq!(state.unfilter(&mut s, 0), vec![Transition::ItemUnfilter(0)]);
        assert_eq!(state.active(), Some(1), "unfilter never activates");
        assert!(state.unfilter(&mut s, 0).is_empty());
    }

    #[test]
    fn repaint_after_filter_settles_container() {
        let mut s = store(&[Some("x")]);
        let mut state = ActiveState::new(ActivationRules::default());
        let _ = state.apply(&mut s, Some(0), true);
        let _ = state.filter(&mut s, 0);
        assert_eq!(
            state.apply(&mut s, None, true),
            vec![
                Transition::CategoryBlur("x".into()),
                Transition::ContainerInactive,
            ]
        );
    }

    #[test]
    fn focus_guards() {
        let mut s = store(&[None, None]);
        let mut state = ActiveState::new(ActivationRules::default());
        assert_eq!(
            state.focus(&mut s, 1),
            vec![Transition::ItemFocus(1), Transition::ContainerActive]
        );
        assert!(state.focus(&mut s, 1).is_empty(), "already active");
        assert!(state.focus(&mut s, 7).is_empty(), "no such item");
        assert_eq!(
            state.blur_all(&mut s),
            vec![Transition::ItemBlur(1), Transition::ContainerInactive]
        );
    }
}
