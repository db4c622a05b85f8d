//! Listing records produced by the extraction pipeline

use serde::Serialize;
use std::fmt;

/// Scale factor for the per-100k value column
const VALUE_SCALE: f64 = 100_000.0;

/// An unfiltered extraction candidate from one product card
///
/// Zero values mean the corresponding field could not be parsed; an empty
/// label means the card had no title element.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub server_label: String,
    pub offer_count: u64,
    pub price_usd: f64,
}

impl RawRecord {
    pub fn new(server_label: impl Into<String>, offer_count: u64, price_usd: f64) -> Self {
        Self {
            server_label: server_label.into(),
            offer_count,
            price_usd,
        }
    }
}

/// A record that passed the region filter, with derived fields filled in
///
/// Fields are private so a constructed record can not drift from its
/// derived `value_per_100k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRecord {
    server: String,
    offers: u64,
    #[serde(rename = "priceUSD")]
    price_usd: f64,
    #[serde(rename = "valuePer100k")]
    value_per_100k: String,
}

impl AcceptedRecord {
    /// Builds an accepted record from a raw one
    ///
    /// Returns `None` when the label is empty. Negative or non-finite
    /// prices are clamped to zero.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        if raw.server_label.is_empty() {
            return None;
        }

        let price_usd = if raw.price_usd.is_finite() && raw.price_usd > 0.0 {
            raw.price_usd
        } else {
            0.0
        };

        Some(Self {
            server: raw.server_label.clone(),
            offers: raw.offer_count,
            price_usd,
            value_per_100k: format_value_per_100k(price_usd),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn offers(&self) -> u64 {
        self.offers
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
    }

    /// Price scaled to 100,000 units, as a fixed 6-decimal string
    pub fn value_per_100k(&self) -> &str {
        &self.value_per_100k
    }
}

impl fmt::Display for AcceptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} offers) ${} = {} per 100k",
            self.server, self.offers, self.price_usd, self.value_per_100k
        )
    }
}

/// Formats `price_usd * 100000` with exactly six fractional digits
pub fn format_value_per_100k(price_usd: f64) -> String {
    format!("{:.6}", price_usd * VALUE_SCALE)
}
