use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking_types::{AddOnPasses, BookingSession, DateRange, Site};

/// Per-person, per-night pass rates and the deposit share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRates {
    /// Adult pass, per night
    pub adult_pass_rate: f64,
    /// Teen pass, per night
    pub teen_pass_rate: f64,
    /// Share of the total due as deposit
    pub deposit_rate: f64,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            adult_pass_rate: 20.0,
            teen_pass_rate: 10.0,
            deposit_rate: 0.25,
        }
    }
}

/// Derived cost of the stay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingSnapshot {
    /// Nights booked
    pub nights: u32,
    /// Nightly rate of the selected site
    pub daily_rate: f64,
    /// Nights times the site rate
    pub site_subtotal: f64,
    /// Add-on passes for the whole stay
    pub add_on_subtotal: f64,
    /// Site plus add-ons
    pub total: f64,
    /// Amount due at booking, rounded up
    pub deposit: f64,
    /// People holding a pass, children included
    pub pass_holders: u32,
}

/// Whole days between two dates, in either order
pub fn nights_between(start_date: NaiveDate, end_date: NaiveDate) -> u32 {
    u32::try_from((end_date - start_date).num_days().unsigned_abs()).unwrap_or(u32::MAX)
}

/// `ceil(total * rate)`
pub fn deposit_for(total: f64, rate: f64) -> f64 {
    (total * rate).ceil()
}

/// Prices a stay from dates, site and add-on passes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricingCalculator {
    rates: PricingRates,
}

impl PricingCalculator {
    /// Calculator with the given rates, or the campground defaults
    pub fn new(rates: Option<PricingRates>) -> Self {
        Self {
            rates: rates.unwrap_or_default(),
        }
    }

    /// Nothing until both dates and a site are known
    pub fn calculate(
        &self,
        date_range: &DateRange,
        selected_site: Option<&Site>,
        add_ons: &AddOnPasses,
    ) -> Option<PricingSnapshot> {
        let site = selected_site?;
        let (start_date, end_date) = date_range.bounds()?;

        let nights = nights_between(start_date, end_date);
        let nights_f = f64::from(nights);
        let site_subtotal = nights_f * site.daily_rate;

        let add_on_subtotal = if add_ons.enabled {
            nights_f
                * (f64::from(add_ons.adults) * self.rates.adult_pass_rate
                    + f64::from(add_ons.teens) * self.rates.teen_pass_rate)
        } else {
            0.0
        };

        let total = site_subtotal + add_on_subtotal;

        Some(PricingSnapshot {
            nights,
            daily_rate: site.daily_rate,
            site_subtotal,
            add_on_subtotal,
            total,
            deposit: deposit_for(total, self.rates.deposit_rate),
            pass_holders: add_ons.pass_holders(),
        })
    }

    /// Prices the session as it currently stands
    pub fn snapshot(&self, session: &BookingSession) -> Option<PricingSnapshot> {
        self.calculate(
            &session.date_range,
            session.selected_site.as_ref(),
            &session.add_ons,
        )
    }
}
