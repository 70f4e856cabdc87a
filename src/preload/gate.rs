//! Per-image load gate.
//!
//! The gate is one-way: once it opens it never closes again, and signals
//! arriving after that are ignored. Which signal opens it depends on the
//! image's [`Eagerness`]; signals meant for another policy are ignored too.
//!
//! ```text
//! Idle ──open──▶ Loading ──▶ Loaded
//!                   │
//!                   └──────▶ Failed   (placeholder stays, no retry)
//! ```

use super::{Eagerness, ImageDescriptor};
use serde::Serialize;
use std::fmt;

/// What opened a gate, or started a warm-up fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    Mount,
    SectionVisible,
    Proximity,
    Preload,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Mount => "mount",
            Trigger::SectionVisible => "section visible",
            Trigger::Proximity => "proximity",
            Trigger::Preload => "preload",
        })
    }
}

/// Result of mounting a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Start fetching now.
    Start(Trigger),
    /// Wait for the owning section to become visible.
    AwaitSection,
    /// Wait for the image to approach the viewport.
    AwaitProximity,
}

/// What the page should render for the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDisplay {
    /// Nothing requested yet; no `<img>` element.
    Hidden,
    /// Fetch in flight, or failed: pulsing placeholder.
    Placeholder,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct LoadGate {
    image: ImageDescriptor,
    /// `None` while idle; set once, never cleared.
    opened: Option<(Trigger, Fetch)>,
}

impl LoadGate {
    pub fn new(image: ImageDescriptor) -> Self {
        Self {
            image,
            opened: None,
        }
    }

    /// Decide at mount time. `section_visible` is the owning section's
    /// visibility as of mount.
    pub fn mount(&mut self, section_visible: bool) -> GateDecision {
        if let Some((trigger, _)) = self.opened {
            return GateDecision::Start(trigger);
        }
        match self.image.eagerness() {
            Eagerness::Eager => self.start(Trigger::Mount),
            Eagerness::LazyOnVisible if section_visible => self.start(Trigger::SectionVisible),
            Eagerness::LazyOnVisible => GateDecision::AwaitSection,
            Eagerness::LazyOnProximity => GateDecision::AwaitProximity,
        }
    }

    fn start(&mut self, trigger: Trigger) -> GateDecision {
        self.open(trigger);
        GateDecision::Start(trigger)
    }

    /// The owning section became visible. Returns `true` if this opened the
    /// gate.
    pub fn section_visible(&mut self) -> bool {
        self.image.eagerness() == Eagerness::LazyOnVisible && self.open(Trigger::SectionVisible)
    }

    /// The image came within the proximity margin. Returns `true` if this
    /// opened the gate.
    pub fn proximity_reached(&mut self) -> bool {
        self.image.eagerness() == Eagerness::LazyOnProximity && self.open(Trigger::Proximity)
    }

    fn open(&mut self, trigger: Trigger) -> bool {
        if self.opened.is_some() {
            return false;
        }
        self.opened = Some((trigger, Fetch::Pending));
        true
    }

    /// True once the gate has opened, whatever happened to the fetch since.
    pub fn is_loading(&self) -> bool {
        self.opened.is_some()
    }

    /// What opened the gate, if it is open.
    pub fn opened_by(&self) -> Option<Trigger> {
        self.opened.map(|(trigger, _)| trigger)
    }

    /// The fetch finished. Ignored unless a fetch is in flight.
    pub fn mark_loaded(&mut self) {
        self.settle(Fetch::Loaded);
    }

    /// The fetch failed. The placeholder stays up and nothing is retried.
    pub fn mark_failed(&mut self) {
        self.settle(Fetch::Failed);
    }

    fn settle(&mut self, outcome: Fetch) {
        if let Some((_, fetch @ Fetch::Pending)) = &mut self.opened {
            *fetch = outcome;
        }
    }

    pub fn display(&self) -> ImageDisplay {
        match self.opened {
            None => ImageDisplay::Hidden,
            Some((_, Fetch::Pending | Fetch::Failed)) => ImageDisplay::Placeholder,
            Some((_, Fetch::Loaded)) => ImageDisplay::Loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(eagerness: Eagerness) -> LoadGate {
        LoadGate::new(ImageDescriptor::new("/img/seer.webp", eagerness))
    }

    #[test]
    fn eager_starts_on_mount() {
        let mut g = gate(Eagerness::Eager);
        assert_eq!(g.mount(false), GateDecision::Start(Trigger::Mount));
        assert!(g.is_loading());
        assert_eq!(g.display(), ImageDisplay::Placeholder);
    }

    #[test]
    fn lazy_on_visible_waits_for_section() {
        let mut g = gate(Eagerness::LazyOnVisible);
        assert_eq!(g.mount(false), GateDecision::AwaitSection);
        assert_eq!(g.display(), ImageDisplay::Hidden);
        assert!(!g.proximity_reached());
        assert!(g.section_visible());
        assert_eq!(g.opened_by(), Some(Trigger::SectionVisible));
    }

    #[test]
    fn lazy_on_visible_starts_if_section_already_visible() {
        let mut g = gate(Eagerness::LazyOnVisible);
        assert_eq!(g.mount(true), GateDecision::Start(Trigger::SectionVisible));
    }

    #[test]
    fn lazy_on_proximity_ignores_section() {
        let mut g = gate(Eagerness::LazyOnProximity);
        assert_eq!(g.mount(true), GateDecision::AwaitProximity);
        assert!(!g.section_visible());
        assert!(!g.is_loading());
        assert!(g.proximity_reached());
        assert!(g.is_loading());
    }

    #[test]
    fn gate_is_one_way() {
        let mut g = gate(Eagerness::LazyOnVisible);
        g.mount(false);
        assert!(g.section_visible());
        assert!(!g.section_visible());
        g.mark_loaded();
        assert!(!g.section_visible());
        assert!(g.is_loading());
        assert_eq!(g.display(), ImageDisplay::Loaded);
    }

    #[test]
    fn remount_of_open_gate_reports_original_trigger() {
        let mut g = gate(Eagerness::LazyOnProximity);
        g.mount(false);
        g.proximity_reached();
        assert_eq!(g.mount(false), GateDecision::Start(Trigger::Proximity));
    }

    #[test]
    fn failure_keeps_placeholder_without_retry() {
        let mut g = gate(Eagerness::Eager);
        g.mount(false);
        g.mark_failed();
        assert_eq!(g.display(), ImageDisplay::Placeholder);
        g.mark_loaded();
        assert_eq!(g.display(), ImageDisplay::Placeholder);
        assert!(!g.proximity_reached());
        assert!(!g.section_visible());
    }

    #[test]
    fn remount_after_load_does_not_restart() {
        let mut g = gate(Eagerness::LazyOnVisible);
        g.mount(true);
        g.mark_loaded();
        assert_eq!(g.mount(false), GateDecision::Start(Trigger::SectionVisible));
        assert_eq!(g.display(), ImageDisplay::Loaded);
    }

    #[test]
    fn load_events_before_open_are_ignored() {
        let mut g = gate(Eagerness::LazyOnVisible);
        g.mark_loaded();
        assert_eq!(g.display(), ImageDisplay::Hidden);
    }
}
