//! Image load gating.
//!
//! Decides, per image, when its network fetch starts. The catalog is image
//! heavy, so images below the fold should not compete with the hero for
//! bandwidth, but they should be ready by the time the visitor scrolls to
//! them.
//!
//! ## Eagerness
//!
//! | Eagerness | Fetch starts when |
//! |-----------|-------------------|
//! | [`Eagerness::Eager`] | the image mounts |
//! | [`Eagerness::LazyOnVisible`] | the owning section reports visible |
//! | [`Eagerness::LazyOnProximity`] | the image itself comes within the proximity margin |
//!
//! ## Pieces
//!
//! | Module | Role |
//! |--------|------|
//! | [`gate`] | One-way per-image state: idle → loading → loaded/failed |
//! | [`cache`] | Page-lifetime set of URLs already requested, so duplicate starts are no-ops |
//! | [`observer`] | Viewport intersection watch; each registration fires at most once |
//! | [`layout`] | Page model that wires sections, gates, cache, and observers together |
//!
//! Geometry is one-dimensional: only vertical position matters for scroll.
//! All rectangles are in page coordinates (pixels from the top of the page).

pub mod cache;
pub mod gate;
pub mod layout;
pub mod observer;

pub use cache::{ImageFetcher, PreloadCache, preload_all};
pub use gate::{GateDecision, ImageDisplay, LoadGate, Trigger};
pub use layout::{FetchEvent, LayoutError, LayoutSpec, PageLayout};
pub use observer::{ObserverHandle, ViewportObserver};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Eagerness {
    Eager,
    LazyOnVisible,
    LazyOnProximity,
}

/// An image and its loading policy. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    url: String,
    eagerness: Eagerness,
}

impl ImageDescriptor {
    pub fn new(url: impl Into<String>, eagerness: Eagerness) -> Self {
        Self {
            url: url.into(),
            eagerness,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn eagerness(&self) -> Eagerness {
        self.eagerness
    }
}

/// Vertical extent of an element.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    /// Whether `rect` overlaps the viewport grown by `margin` on both edges.
    pub fn intersects(&self, rect: &Rect, margin: f64) -> bool {
        rect.top < self.scroll_y + self.height + margin && rect.bottom() > self.scroll_y - margin
    }

    /// The one-shot mount check for sections: the top edge is above the
    /// bottom of the viewport plus `margin`. Sections already scrolled past
    /// count as revealed too.
    pub fn reveals_at_mount(&self, rect: &Rect, margin: f64) -> bool {
        rect.top - self.scroll_y < self.height + margin
    }
}
