use serde::Serialize;
use tracing::debug;

use crate::booking_types::{Site, SiteLocation, SiteType, WizardError};

/// Sites shown per page of availability results
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Shown instead of an empty table when the location filter matches nothing
pub const EMPTY_LOCATION_MESSAGE: &str =
    "No sites available in this location. Try another location or change your dates.";

/// Sites whose location matches `filter`, in fetch order. `None` keeps every site.
pub fn filter_sites(sites: &[Site], filter: Option<SiteLocation>) -> Vec<&Site> {
    match filter {
        None => sites.iter().collect(),
        Some(location) => sites
            .iter()
            .filter(|site| site.location == Some(location))
            .collect(),
    }
}

/// Number of pages needed for `count` items, never less than one
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// The items on 1-based `page`; out of range pages yield an empty slice
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Filtered, paginated view over the results of the latest availability search
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityView {
    sites: Vec<Site>,
    site_type: SiteType,
    location_filter: Option<SiteLocation>,
    page: usize,
    page_size: usize,
}

/// What the guest sees on step 2
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitePage {
    /// Sites on the current page
    pub sites: Vec<Site>,
    /// Current page, 1-based
    pub page: usize,
    /// Pages available under the current filter
    pub total_pages: usize,
    /// Sites returned by the search
    pub total_sites: usize,
    /// Sites left after the location filter
    pub filtered_count: usize,
    /// Active location filter, `None` for all locations
    pub location_filter: Option<SiteLocation>,
    /// Display name of the active location filter
    pub location_name: Option<&'static str>,
    /// Whether the location filter may be changed for this search
    pub location_filter_enabled: bool,
    /// Set when the filter leaves nothing to show
    pub empty_message: Option<&'static str>,
}

impl AvailabilityView {
    /// Fresh view on page 1 with no location filter
    pub fn new(sites: Vec<Site>, site_type: SiteType, page_size: usize) -> Self {
        Self {
            sites,
            site_type,
            location_filter: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Site type the search was run for
    pub fn site_type(&self) -> SiteType {
        self.site_type
    }

    /// Every site the search returned
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Active location filter
    pub fn location_filter(&self) -> Option<SiteLocation> {
        self.location_filter
    }

    /// Current page, 1-based
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Changes the location filter and goes back to page 1
    pub fn set_location_filter(
        &mut self,
        filter: Option<SiteLocation>,
    ) -> Result<(), WizardError> {
        if filter.is_some() && !self.site_type.supports_location_filter() {
            return Err(WizardError::LocationFilterUnavailable);
        }

        self.location_filter = filter;
        self.page = 1;
        debug!(
            ?filter,
            filtered = self.filtered().len(),
            "Location filter changed"
        );
        Ok(())
    }

    /// Sites passing the location filter
    pub fn filtered(&self) -> Vec<&Site> {
        filter_sites(&self.sites, self.location_filter)
    }

    /// Pages under the current filter
    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), self.page_size)
    }

    /// Jumps to page `page`, clamped into range. Returns the page landed on.
    pub fn goto_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages());
        self.page
    }

    /// Next page, staying on the last one
    pub fn next_page(&mut self) -> usize {
        self.goto_page(self.page.saturating_add(1))
    }

    /// Previous page, staying on the first one
    pub fn prev_page(&mut self) -> usize {
        self.goto_page(self.page.saturating_sub(1))
    }

    /// Sites on the current page
    pub fn visible(&self) -> Vec<&Site> {
        page_slice(&self.filtered(), self.page, self.page_size).to_vec()
    }

    /// Looks a site up in the full result list, ignoring filter and page
    pub fn find(&self, site_id: i64) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == site_id)
    }

    /// Renderable snapshot of the current page
    pub fn page(&self) -> SitePage {
        let filtered = self.filtered();
        let sites = page_slice(&filtered, self.page, self.page_size)
            .iter()
            .map(|site| (*site).clone())
            .collect();

        SitePage {
            sites,
            page: self.page,
            total_pages: total_pages(filtered.len(), self.page_size),
            total_sites: self.sites.len(),
            filtered_count: filtered.len(),
            location_filter: self.location_filter,
            location_name: self.location_filter.map(|location| location.display_name()),
            location_filter_enabled: self.site_type.supports_location_filter(),
            empty_message: filtered.is_empty().then_some(EMPTY_LOCATION_MESSAGE),
        }
    }
}
