// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Throttle and debounce limiters and the repaint scheduler built on them.
//!
//! ## Clock
//!
//! Nothing here reads a clock or owns a timer. Every call takes `now` in
//! milliseconds from a monotonic source the host chooses. A limiter that
//! wants to fire later reports a [`deadline`](Limiter::deadline); the host
//! calls [`poll`](Limiter::poll) once that time has come. Tests drive time by
//! hand.
//!
//! ## Semantics
//!
//! - [`Throttle`] fires at most once per `wait`. The leading edge fires on the
//!   first signal of a window, the trailing edge fires once at the end of a
//!   window that saw further signals. Either edge can be switched off.
//! - [`Debounce`] fires once `wait` has passed without a signal. Each signal
//!   supersedes the pending one and restarts the window. With `immediate`
//!   the first signal of a burst fires instead and the trailing edge is
//!   dropped.
//!
//! ```
//! use scrollstory::schedule::Throttle;
//!
//! let mut t = Throttle::new(100);
//! assert!(t.signal(0), "leading edge");
//! assert!(!t.signal(30));
//! assert_eq!(t.deadline(), Some(100));
//! assert!(t.poll(100), "trailing edge");
//! ```

use serde::Deserialize;
use tracing::trace;

use crate::options::Options;

/// Which edges a [`Throttle`] fires on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThrottleOptions {
    /// Fire on the first signal of a window.
    pub leading: bool,
    /// Fire at the end of a window that saw suppressed signals.
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

/// Rate limiter firing at most once per `wait` milliseconds.
#[derive(Clone, Debug)]
pub struct Throttle {
    wait: u64,
    edges: ThrottleOptions,
    previous: Option<u64>,
    pending: Option<u64>,
}

impl Throttle {
    /// Throttle with both edges enabled.
    pub fn new(wait: u64) -> Self {
        Self::with_options(wait, ThrottleOptions::default())
    }

    /// Throttle with explicit edge selection.
    pub fn with_options(wait: u64, edges: ThrottleOptions) -> Self {
        Self {
            wait,
            edges,
            previous: None,
            pending: None,
        }
    }

    /// Record a signal. Returns `true` if it should be handled now.
    pub fn signal(&mut self, now: u64) -> bool {
        let previous = match self.previous {
            Some(previous) => previous,
            None if self.edges.leading => {
                return self.fire(now);
            }
            None => {
                self.previous = Some(now);
                now
            }
        };
        let elapsed = now.saturating_sub(previous);
        if elapsed >= self.wait {
            return self.fire(now);
        }
        if self.edges.trailing && self.pending.is_none() {
            self.pending = Some(previous + self.wait);
        }
        false
    }

    /// Returns `true` if the trailing edge is due at `now`.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                self.previous = self.edges.leading.then_some(now);
                true
            }
            _ => false,
        }
    }

    /// When the pending trailing edge is due, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.pending
    }

    /// Drop the pending edge and forget the current window.
    pub fn cancel(&mut self) {
        self.previous = None;
        self.pending = None;
    }

    fn fire(&mut self, now: u64) -> bool {
        self.pending = None;
        self.previous = Some(now);
        true
    }
}

/// Rate limiter firing once a burst of signals has gone quiet.
#[derive(Clone, Debug)]
pub struct Debounce {
    wait: u64,
    immediate: bool,
    pending: Option<u64>,
}

impl Debounce {
    /// Trailing-edge debounce.
    pub fn new(wait: u64) -> Self {
        Self {
            wait,
            immediate: false,
            pending: None,
        }
    }

    /// Fire on the first signal of a burst instead of after it.
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    /// Record a signal. Returns `true` if it should be handled now, which
    /// only happens in immediate mode.
    pub fn signal(&mut self, now: u64) -> bool {
        let fire_now = self.immediate && self.pending.is_none();
        self.pending = Some(now + self.wait);
        fire_now
    }

    /// Returns `true` if the trailing edge is due at `now`.
    ///
    /// In immediate mode the window still closes here but nothing fires.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                !self.immediate
            }
            _ => false,
        }
    }

    /// When the current window closes, if one is open.
    pub fn deadline(&self) -> Option<u64> {
        self.pending
    }

    /// Drop the pending edge.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Either limiter behind one interface.
#[derive(Clone, Debug)]
pub enum Limiter {
    /// See [`Throttle`].
    Throttle(Throttle),
    /// See [`Debounce`].
    Debounce(Debounce),
}

impl Limiter {
    /// Record a signal. Returns `true` if it should be handled now.
    pub fn signal(&mut self, now: u64) -> bool {
        match self {
            Self::Throttle(t) => t.signal(now),
            Self::Debounce(d) => d.signal(now),
        }
    }

    /// Returns `true` if a deferred edge is due at `now`.
    pub fn poll(&mut self, now: u64) -> bool {
        match self {
            Self::Throttle(t) => t.poll(now),
            Self::Debounce(d) => d.poll(now),
        }
    }

    /// When the deferred edge is due, if any.
    pub fn deadline(&self) -> Option<u64> {
        match self {
            Self::Throttle(t) => t.deadline(),
            Self::Debounce(d) => d.deadline(),
        }
    }

    /// Drop any deferred edge.
    pub fn cancel(&mut self) {
        match self {
            Self::Throttle(t) => t.cancel(),
            Self::Debounce(d) => d.cancel(),
        }
    }
}

/// How scroll signals are limited.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThrottleType {
    /// At most one repaint per `scrollSensitivity`.
    #[default]
    Throttle,
    /// One repaint after scrolling pauses for `scrollSensitivity`.
    Debounce,
}

/// What caused a repaint.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cause {
    /// A scroll signal passed the scroll limiter.
    Scroll,
    /// A resize burst settled.
    Resize,
    /// The host asked for a repaint directly.
    Request,
}

/// One run of the repaint pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Repaint {
    /// Re-read geometry before resolving positions.
    pub refresh_offsets: bool,
    /// Signal that produced this run.
    pub cause: Cause,
}

/// Coalesces scroll and resize signals into [`Repaint`] jobs.
///
/// Scroll goes through a throttle or a debounce, resize is always debounced.
/// An offset refresh requested between runs is carried by the next job,
/// whatever its cause.
#[derive(Clone, Debug)]
pub struct UpdateScheduler {
    scroll: Limiter,
    resize: Debounce,
    refresh_on_resize: bool,
    refresh_requested: bool,
}

impl UpdateScheduler {
    /// Scheduler with explicit limiters.
    pub fn new(scroll: Limiter, resize: Debounce, refresh_on_resize: bool) -> Self {
        Self {
            scroll,
            resize,
            refresh_on_resize,
            refresh_requested: false,
        }
    }

    /// Scheduler configured from story options.
    pub fn from_options(options: &Options) -> Self {
        let scroll = match options.throttle_type {
            ThrottleType::Throttle => Limiter::Throttle(Throttle::with_options(
                options.scroll_sensitivity,
                options.throttle_options,
            )),
            ThrottleType::Debounce => Limiter::Debounce(Debounce::new(options.scroll_sensitivity)),
        };
        Self::new(
            scroll,
            Debounce::new(options.resize_sensitivity),
            options.update_offsets_on_resize,
        )
    }

    /// Record a scroll signal. Returns a job if it runs now.
    pub fn scroll(&mut self, now: u64) -> Option<Repaint> {
        let fire = self.scroll.signal(now);
        trace!(now, fire, "scroll signal");
        fire.then(|| self.job(Cause::Scroll))
    }

    /// Record a resize signal. Resize is debounced, so the job arrives
    /// from [`poll`](Self::poll).
    pub fn resize(&mut self, now: u64) {
        let _ = self.resize.signal(now);
        trace!(now, deadline = ?self.resize.deadline(), "resize signal");
    }

    /// Ask for an offset refresh on the next job.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Whether an offset refresh is waiting for the next job.
    pub fn refresh_pending(&self) -> bool {
        self.refresh_requested
    }

    /// A job to run right away, carrying any pending refresh.
    pub fn request(&mut self) -> Repaint {
        self.job(Cause::Request)
    }

    /// Jobs whose window resolved by `now`, earliest deadline first.
    pub fn poll(&mut self, now: u64) -> Vec<Repaint> {
        let mut due = Vec::with_capacity(2);
        if let Some(deadline) = self.scroll.deadline() {
            due.push((deadline, Cause::Scroll));
        }
        if let Some(deadline) = self.resize.deadline() {
            due.push((deadline, Cause::Resize));
        }
        due.sort_by_key(|&(deadline, _)| deadline);

        let mut jobs = Vec::new();
        for (_, cause) in due {
            let fired = match cause {
                Cause::Scroll => self.scroll.poll(now),
                _ => self.resize.poll(now),
            };
            if !fired {
                continue;
            }
            if cause == Cause::Resize && self.refresh_on_resize {
                self.refresh_requested = true;
            }
            jobs.push(self.job(cause));
        }
        if !jobs.is_empty() {
            trace!(now, jobs = jobs.len(), "deferred jobs due");
        }
        jobs
    }

    /// Earliest pending deadline across both limiters.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.scroll.deadline(), self.resize.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop all deferred work, including a pending refresh.
    pub fn cancel(&mut self) {
        self.scroll.cancel();
        self.resize.cancel();
        self.refresh_requested = false;
    }

    fn job(&mut self, cause: Cause) -> Repaint {
        Repaint {
            refresh_offsets: core::mem::take(&mut self.refresh_requested),
            cause,
        }
    }
}
