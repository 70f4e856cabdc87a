//! Viewport intersection watch.
//!
//! Elements are registered with their geometry, a look-ahead margin, and a
//! target value identifying what to notify. Each time the viewport changes,
//! [`ViewportObserver::observe`] hands back the targets of every element that
//! now intersects the margin-expanded viewport and drops their registrations:
//! a registration fires at most once. That matches the load gate, which never
//! needs a second signal.
//!
//! Targets are returned instead of invoking stored closures so the caller can
//! dispatch into state it owns mutably (e.g. the gates of a page) without
//! shared ownership.

use super::{Rect, Viewport};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(u64);

#[derive(Debug)]
struct Registration<T> {
    rect: Rect,
    margin: f64,
    target: T,
}

#[derive(Debug)]
pub struct ViewportObserver<T> {
    registrations: BTreeMap<ObserverHandle, Registration<T>>,
    next_id: u64,
}

impl<T> Default for ViewportObserver<T> {
    fn default() -> Self {
        Self {
            registrations: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> ViewportObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `rect` with look-ahead `margin`; `target` is returned when it
    /// first intersects.
    pub fn register(&mut self, rect: Rect, margin: f64, target: T) -> ObserverHandle {
        let handle = ObserverHandle(self.next_id);
        self.next_id += 1;
        self.registrations.insert(
            handle,
            Registration {
                rect,
                margin,
                target,
            },
        );
        handle
    }

    /// Stop watching. Returns the target if the registration was still live.
    pub fn unregister(&mut self, handle: ObserverHandle) -> Option<T> {
        self.registrations.remove(&handle).map(|r| r.target)
    }

    pub fn is_registered(&self, handle: ObserverHandle) -> bool {
        self.registrations.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Fire for every registration intersecting `viewport`, in registration
    /// order, and unregister them.
    pub fn observe(&mut self, viewport: &Viewport) -> Vec<T> {
        let hits: Vec<ObserverHandle> = self
            .registrations
            .iter()
            .filter(|(_, r)| viewport.intersects(&r.rect, r.margin))
            .map(|(h, _)| *h)
            .collect();
        hits.into_iter()
            .filter_map(|h| self.unregister(h))
            .collect()
    }
}
