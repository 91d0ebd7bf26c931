//! The document surface the controller renders into.
//!
//! [`Page`] is the small slice of a browser document the host list needs: a
//! container for host elements, a set of filter controls with class lists, and
//! a sentinel element (the footer) whose position against the viewport decides
//! when the next page is due. [`MemoryPage`] is an in-memory document with a
//! simulated scrolling viewport.

use crate::filter::FilterType;
use crate::host::{Fragment, HostElement};
use crate::utils::ElementRect;

pub trait Page {
    fn viewport_height(&self) -> f64;

    fn sentinel_rect(&self) -> ElementRect;

    fn clear_hosts(&mut self);

    fn append_fragment(&mut self, fragment: Fragment);

    fn rendered_count(&self) -> usize;

    fn has_element(&self, id: &str) -> bool;

    /// Id of the first filter control carrying `class_name`.
    fn find_by_class(&self, class_name: &str) -> Option<String>;

    // both return false when no element has `id`
    fn add_class(&mut self, id: &str, class_name: &str) -> bool;

    fn remove_class(&mut self, id: &str, class_name: &str) -> bool;
}

/// Whatever an event was dispatched on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventTarget {
    pub id: String,
    pub class_list: Vec<String>,
}

impl EventTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_list: Vec::new(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_list.push(class_name.into());
        self
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_list.iter().any(|c| c == class_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterControl {
    pub id: String,
    pub label: String,
    pub class_list: Vec<String>,
}

impl FilterControl {
    fn has_class(&self, class_name: &str) -> bool {
        self.class_list.iter().any(|c| c == class_name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub viewport_height: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub footer_height: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            viewport_height: 600.0,
            header_height: 0.0,
            row_height: 50.0,
            footer_height: 40.0,
        }
    }
}

/// Document kept in memory: filter controls above a list of host rows,
/// followed by the footer. Every row is `row_height` tall.
#[derive(Clone, Debug)]
pub struct MemoryPage {
    geometry: Geometry,
    scroll_top: f64,
    controls: Vec<FilterControl>,
    hosts: Vec<HostElement>,
    clear_count: usize,
}

impl MemoryPage {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            scroll_top: 0.0,
            controls: Vec::new(),
            hosts: Vec::new(),
            clear_count: 0,
        }
    }

    /// Page with one control per [`FilterType`], each carrying `control_class`.
    pub fn with_filter_controls(geometry: Geometry, control_class: &str) -> Self {
        let mut page = Self::new(geometry);
        for ft in FilterType::ALL_TYPES {
            page.add_control(ft.id(), ft.label(), control_class);
        }
        page
    }

    pub fn add_control(&mut self, id: &str, label: &str, class_name: &str) {
        self.controls.push(FilterControl {
            id: id.to_string(),
            label: label.to_string(),
            class_list: vec![class_name.to_string()],
        });
    }

    pub fn controls(&self) -> &[FilterControl] {
        &self.controls
    }

    pub fn rendered(&self) -> &[HostElement] {
        &self.hosts
    }

    // bumped on every clear_hosts, lets callers tell a reset from an append
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn document_height(&self) -> f64 {
        self.geometry.header_height
            + self.hosts.len() as f64 * self.geometry.row_height
            + self.geometry.footer_height
    }

    fn max_scroll(&self) -> f64 {
        (self.document_height() - self.geometry.viewport_height).max(0.0)
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_top = y.clamp(0.0, self.max_scroll());
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.scroll_top + dy);
    }

    /// Resolves what an event aimed at `id` lands on: the control itself, or
    /// a bare element when no control has that id.
    pub fn event_target(&self, id: &str) -> EventTarget {
        match self.controls.iter().find(|c| c.id == id) {
            Some(control) => control
                .class_list
                .iter()
                .fold(EventTarget::new(&control.id), |target, class_name| {
                    target.with_class(class_name.as_str())
                }),
            None => EventTarget::new(id),
        }
    }

    fn control_mut(&mut self, id: &str) -> Option<&mut FilterControl> {
        self.controls.iter_mut().find(|c| c.id == id)
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}

impl Page for MemoryPage {
    fn viewport_height(&self) -> f64 {
        self.geometry.viewport_height
    }

    fn sentinel_rect(&self) -> ElementRect {
        let top = self.geometry.header_height + self.hosts.len() as f64 * self.geometry.row_height;
        ElementRect {
            top: top - self.scroll_top,
            height: self.geometry.footer_height,
        }
    }

    fn clear_hosts(&mut self) {
        self.hosts.clear();
        self.clear_count += 1;
        self.scroll_to(self.scroll_top);
    }

    fn append_fragment(&mut self, fragment: Fragment) {
        self.hosts.extend(fragment.into_elements());
    }

    fn rendered_count(&self) -> usize {
        self.hosts.len()
    }

    fn has_element(&self, id: &str) -> bool {
        self.controls.iter().any(|c| c.id == id)
    }

    fn find_by_class(&self, class_name: &str) -> Option<String> {
        self.controls
            .iter()
            .find(|c| c.has_class(class_name))
            .map(|c| c.id.clone())
    }

    fn add_class(&mut self, id: &str, class_name: &str) -> bool {
        match self.control_mut(id) {
            Some(control) => {
                if !control.has_class(class_name) {
                    control.class_list.push(class_name.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn remove_class(&mut self, id: &str, class_name: &str) -> bool {
        match self.control_mut(id) {
            Some(control) => {
                control.class_list.retain(|c| c != class_name);
                true
            }
            None => false,
        }
    }
}
