//! Host list state and the handlers that drive it.
//!
//! [`Controller`] owns the loaded hosts, the filtered view and the page cursor.
//! Rendered output is always the first `page_number * page_size` entries of
//! the filtered view; the cursor only grows until the filter changes, which
//! clears the page and starts over from zero.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::filter::{self, FilterType};
use crate::host::{get_host_element, Fragment, Host};
use crate::page::{EventTarget, Page};
use crate::utils::{self, Key};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("page is missing required element '{id}'")]
    MissingElement { id: String },

    #[error("page size must be greater than zero")]
    InvalidPageSize,
}

/// What a handler did with an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub handled: bool,
    pub default_prevented: bool,
}

#[derive(Debug)]
pub struct Controller<P: Page> {
    page: P,
    settings: Settings,
    hosts: Vec<Host>,
    filtered_hosts: Vec<Host>,
    page_number: usize,
    active_filter: Option<FilterType>,
    filtration_enabled: bool,
    scroll_enabled: bool,
}

impl<P: Page> Controller<P> {
    /// Checks that the page carries a control for every filter type.
    pub fn new(page: P, settings: Settings) -> Result<Self, ControllerError> {
        if settings.page_size == 0 {
            return Err(ControllerError::InvalidPageSize);
        }
        if let Some(missing) = FilterType::ALL_TYPES
            .into_iter()
            .find(|ft| !page.has_element(ft.id()))
        {
            return Err(ControllerError::MissingElement {
                id: missing.id().to_string(),
            });
        }
        Ok(Self {
            page,
            settings,
            hosts: Vec::new(),
            filtered_hosts: Vec::new(),
            page_number: 0,
            active_filter: None,
            filtration_enabled: false,
            scroll_enabled: false,
        })
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn filtered_hosts(&self) -> &[Host] {
        &self.filtered_hosts
    }

    /// The hosts currently on the page, in page order.
    pub fn rendered_hosts(&self) -> &[Host] {
        let shown = self
            .page_number
            .saturating_mul(self.settings.page_size)
            .min(self.filtered_hosts.len());
        &self.filtered_hosts[..shown]
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn active_filter(&self) -> Option<FilterType> {
        self.active_filter
    }

    pub fn is_wired(&self) -> bool {
        self.filtration_enabled && self.scroll_enabled
    }

    pub fn has_more_pages(&self) -> bool {
        utils::next_page_is_available(
            self.filtered_hosts.len(),
            self.page_number,
            self.settings.page_size,
        )
    }

    /// Load callback: stores the hosts, then enables filtering, shows the
    /// default filter and enables scrolling, in that order.
    pub fn on_hosts_loaded(&mut self, hosts: Vec<Host>) -> Result<(), ControllerError> {
        self.hosts = hosts;
        self.filtration_enabled = true;
        self.set_filter_enabled(self.settings.default_filter)?;
        self.scroll_enabled = true;
        Ok(())
    }

    pub fn set_filter_enabled(&mut self, filter_type: FilterType) -> Result<(), ControllerError> {
        if !self.page.has_element(filter_type.id()) {
            return Err(ControllerError::MissingElement {
                id: filter_type.id().to_string(),
            });
        }

        self.filtered_hosts = filter::apply(&self.hosts, filter_type);
        info!(
            filter = %filter_type,
            matched = self.filtered_hosts.len(),
            total = self.hosts.len(),
            "filter enabled"
        );
        self.render_next_pages(true);

        let active_class = self.settings.active_filter_class.clone();
        if let Some(previous) = self.page.find_by_class(&active_class) {
            self.page.remove_class(&previous, &active_class);
        }
        self.page.add_class(filter_type.id(), &active_class);
        self.active_filter = Some(filter_type);
        Ok(())
    }

    fn render_hosts(&mut self, page_number: usize) {
        let from = page_number.saturating_mul(self.settings.page_size);
        let to = from
            .saturating_add(self.settings.page_size)
            .min(self.filtered_hosts.len());

        let mut container = Fragment::new();
        if let Some(slice) = self.filtered_hosts.get(from..to) {
            for host in slice {
                get_host_element(host, &mut container);
            }
        }
        debug!(page = page_number, from, count = container.len(), "rendering page");
        self.page.append_fragment(container);
    }

    pub fn reset(&mut self) {
        self.page_number = 0;
        self.page.clear_hosts();
    }

    /// Appends pages while the sentinel is in view and pages remain. Returns
    /// the number of pages appended.
    pub fn advance(&mut self) -> usize {
        let mut rendered = 0usize;
        while utils::element_is_at_the_bottom(self.page.sentinel_rect(), self.page.viewport_height())
            && self.has_more_pages()
        {
            self.render_hosts(self.page_number);
            self.page_number += 1;
            rendered += 1;
        }
        rendered
    }

    pub fn render_next_pages(&mut self, reset: bool) -> usize {
        if reset {
            self.reset();
        }
        self.advance()
    }

    pub fn on_scroll(&mut self) {
        if !self.scroll_enabled {
            return;
        }
        self.render_next_pages(false);
    }

    pub fn on_filter_click(&mut self, target: &EventTarget) -> Result<EventOutcome, ControllerError> {
        if !self.filtration_enabled || !target.has_class(&self.settings.filter_class) {
            return Ok(EventOutcome::default());
        }
        let handled = self.activate_filter(&target.id)?;
        Ok(EventOutcome {
            handled,
            default_prevented: false,
        })
    }

    pub fn on_filter_keydown(
        &mut self,
        target: &EventTarget,
        key: &Key,
    ) -> Result<EventOutcome, ControllerError> {
        if !self.filtration_enabled
            || !target.has_class(&self.settings.filter_class)
            || !utils::is_activation_event(key)
        {
            return Ok(EventOutcome::default());
        }
        let handled = self.activate_filter(&target.id)?;
        Ok(EventOutcome {
            handled,
            default_prevented: handled,
        })
    }

    // false when the control's id names no filter
    fn activate_filter(&mut self, id: &str) -> Result<bool, ControllerError> {
        match id.parse::<FilterType>() {
            Ok(filter_type) => {
                self.set_filter_enabled(filter_type)?;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "ignoring activation of unknown filter control");
                Ok(false)
            }
        }
    }
}
