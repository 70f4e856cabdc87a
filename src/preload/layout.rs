//! Page model for exercising the gates end to end.
//!
//! A [`LayoutSpec`] describes a page (viewport height, an optional warm-up
//! list, sections with their images and geometry) and is usually read from a
//! TOML file:
//!
//! ```toml
//! viewport_height = 800
//! preload = ["/img/hero.webp"]
//!
//! [[sections]]
//! id = "catalog"
//! top = 1400
//! height = 900
//!
//! [[sections.images]]
//! url = "/img/pomfret.webp"
//! eagerness = "lazy-on-visible"
//! top = 1500
//! height = 300
//! ```
//!
//! All coordinates are page coordinates, images included.
//!
//! [`PageLayout`] owns the page's [`PreloadCache`], one [`LoadGate`] per image,
//! and a single [`ViewportObserver`] watching both sections (section margin)
//! and proximity-gated images (proximity margin). Mounting and scrolling
//! return the fetches that actually start, in order.

use super::{
    Eagerness, GateDecision, ImageDescriptor, ImageDisplay, LoadGate, PreloadCache, Rect, Trigger,
    Viewport, ViewportObserver, preload_all,
};
use crate::config::ImagesConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Layout validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
    pub viewport_height: f64,
    /// URLs warmed up before anything mounts.
    #[serde(default)]
    pub preload: Vec<String>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    pub id: String,
    pub top: f64,
    pub height: f64,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub url: String,
    pub eagerness: Eagerness,
    pub top: f64,
    pub height: f64,
}

impl SectionSpec {
    pub fn rect(&self) -> Rect {
        Rect::new(self.top, self.height)
    }
}

impl ImageSpec {
    pub fn rect(&self) -> Rect {
        Rect::new(self.top, self.height)
    }
}

impl LayoutSpec {
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, LayoutError> {
        let spec: LayoutSpec = toml::from_str(content)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(LayoutError::Validation(
                "viewport_height must be positive".into(),
            ));
        }
        for section in &self.sections {
            check_rect(&section.id, section.top, section.height)?;
            for image in &section.images {
                check_rect(&image.url, image.top, image.height)?;
            }
        }
        Ok(())
    }
}

fn check_rect(name: &str, top: f64, height: f64) -> Result<(), LayoutError> {
    if !top.is_finite() || !height.is_finite() || height < 0.0 {
        return Err(LayoutError::Validation(format!(
            "'{name}' needs a finite top and a non-negative height"
        )));
    }
    Ok(())
}

/// A fetch that actually went out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchEvent {
    pub url: String,
    /// Owning section id; `None` for warm-up fetches.
    pub section: Option<String>,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy)]
enum Watch {
    Section(usize),
    Image(usize, usize),
}

#[derive(Debug)]
pub struct PageLayout {
    spec: LayoutSpec,
    margins: ImagesConfig,
    cache: PreloadCache,
    observer: ViewportObserver<Watch>,
    gates: Vec<Vec<LoadGate>>,
    /// Finished fetches by URL: `true` for success.
    outcomes: HashMap<String, bool>,
    mounted: bool,
}

impl PageLayout {
    pub fn new(spec: LayoutSpec, margins: &ImagesConfig) -> Self {
        let gates = build_gates(&spec);
        Self {
            spec,
            margins: margins.clone(),
            cache: PreloadCache::new(),
            observer: ViewportObserver::new(),
            gates,
            outcomes: HashMap::new(),
            mounted: false,
        }
    }

    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of sections and images still being watched.
    pub fn pending_watches(&self) -> usize {
        self.observer.len()
    }

    /// Warm up the preload list, mount every section with the page scrolled
    /// to the top, and start whatever is already in range. A second call
    /// without [`navigate_away`](Self::navigate_away) does nothing.
    pub fn mount(&mut self) -> Vec<FetchEvent> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;

        let mut events = Vec::new();
        let mut warmed: Vec<String> = Vec::new();
        preload_all(
            &mut self.cache,
            self.spec.preload.iter().map(String::as_str),
            &mut warmed,
        );
        events.extend(warmed.into_iter().map(|url| FetchEvent {
            url,
            section: None,
            trigger: Trigger::Preload,
        }));

        let viewport = self.viewport_at(0.0);
        for (si, section) in self.spec.sections.iter().enumerate() {
            let visible =
                viewport.reveals_at_mount(&section.rect(), self.margins.section_margin_px);
            let mut awaits_section = false;
            for (ii, image) in section.images.iter().enumerate() {
                match self.gates[si][ii].mount(visible) {
                    GateDecision::Start(trigger) => events.extend(start_fetch(
                        &mut self.cache,
                        &self.outcomes,
                        &mut self.gates[si][ii],
                        section,
                        image,
                        trigger,
                    )),
                    GateDecision::AwaitSection => awaits_section = true,
                    GateDecision::AwaitProximity => {
                        self.observer.register(
                            image.rect(),
                            self.margins.proximity_margin_px,
                            Watch::Image(si, ii),
                        );
                    }
                }
            }
            if awaits_section {
                self.observer.register(
                    section.rect(),
                    self.margins.section_margin_px,
                    Watch::Section(si),
                );
            }
            debug!(section = %section.id, visible, "mounted section");
        }

        events.extend(self.dispatch(&viewport));
        events
    }

    /// Scroll so the viewport's top edge sits at `scroll_y` and return the
    /// fetches that start as a result.
    pub fn scroll_to(&mut self, scroll_y: f64) -> Vec<FetchEvent> {
        let viewport = self.viewport_at(scroll_y);
        self.dispatch(&viewport)
    }

    fn viewport_at(&self, scroll_y: f64) -> Viewport {
        Viewport::new(scroll_y, self.spec.viewport_height)
    }

    fn dispatch(&mut self, viewport: &Viewport) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        for watch in self.observer.observe(viewport) {
            match watch {
                Watch::Section(si) => {
                    let section = &self.spec.sections[si];
                    for (ii, image) in section.images.iter().enumerate() {
                        let gate = &mut self.gates[si][ii];
                        if gate.section_visible() {
                            events.extend(start_fetch(
                                &mut self.cache,
                                &self.outcomes,
                                gate,
                                section,
                                image,
                                Trigger::SectionVisible,
                            ));
                        }
                    }
                }
                Watch::Image(si, ii) => {
                    let section = &self.spec.sections[si];
                    let image = &section.images[ii];
                    let gate = &mut self.gates[si][ii];
                    if gate.proximity_reached() {
                        events.extend(start_fetch(
                            &mut self.cache,
                            &self.outcomes,
                            gate,
                            section,
                            image,
                            Trigger::Proximity,
                        ));
                    }
                }
            }
        }
        for event in &events {
            debug!(url = %event.url, trigger = %event.trigger, "fetch started");
        }
        events
    }

    /// Report a finished fetch. Every gate showing `url` that is waiting on
    /// a fetch settles, and gates opening for `url` later settle on the spot.
    /// URLs never requested are ignored.
    pub fn finish_fetch(&mut self, url: &str, ok: bool) {
        if !self.cache.contains(url) {
            return;
        }
        self.outcomes.insert(url.to_string(), ok);
        for (section, gates) in self.spec.sections.iter().zip(&mut self.gates) {
            for (image, gate) in section.images.iter().zip(gates.iter_mut()) {
                if image.url == url {
                    if ok {
                        gate.mark_loaded();
                    } else {
                        gate.mark_failed();
                    }
                }
            }
        }
    }

    /// What each image currently renders, as `(url, display)` in page order.
    pub fn displays(&self) -> Vec<(&str, ImageDisplay)> {
        self.spec
            .sections
            .iter()
            .zip(&self.gates)
            .flat_map(|(section, gates)| {
                section
                    .images
                    .iter()
                    .zip(gates)
                    .map(|(image, gate)| (image.url.as_str(), gate.display()))
            })
            .collect()
    }

    /// Leave the page: drop every watch, reset the gates, and forget which
    /// URLs were requested.
    pub fn navigate_away(&mut self) {
        self.cache.clear();
        self.outcomes.clear();
        self.observer = ViewportObserver::new();
        self.gates = build_gates(&self.spec);
        self.mounted = false;
    }
}

fn build_gates(spec: &LayoutSpec) -> Vec<Vec<LoadGate>> {
    spec.sections
        .iter()
        .map(|section| {
            section
                .images
                .iter()
                .map(|image| LoadGate::new(ImageDescriptor::new(&image.url, image.eagerness)))
                .collect()
        })
        .collect()
}

/// Request `image` for a gate that just opened. A URL already requested
/// starts nothing; if its fetch has finished the gate takes that outcome.
fn start_fetch(
    cache: &mut PreloadCache,
    outcomes: &HashMap<String, bool>,
    gate: &mut LoadGate,
    section: &SectionSpec,
    image: &ImageSpec,
    trigger: Trigger,
) -> Option<FetchEvent> {
    if cache.request(&image.url) {
        return Some(fetch_event(section, image, trigger));
    }
    match outcomes.get(&image.url) {
        Some(true) => gate.mark_loaded(),
        Some(false) => gate.mark_failed(),
        None => {}
    }
    None
}

fn fetch_event(section: &SectionSpec, image: &ImageSpec, trigger: Trigger) -> FetchEvent {
    FetchEvent {
        url: image.url.clone(),
        section: Some(section.id.clone()),
        trigger,
    }
}
