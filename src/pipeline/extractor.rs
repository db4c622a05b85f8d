//! HTML extractor for product cards
//!
//! This module turns the listing page into [`RawRecord`]s. It is best-effort
//! by construction:
//! - Each card is processed independently; a bad card never stops the pass
//! - Each field is parsed independently; a bad field degrades to zero/empty
//! - A card is dropped only when it has neither a label nor a price

use crate::config::SelectorConfig;
use crate::model::RawRecord;
use crate::pipeline::selector::CardSelectors;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// A parsed field value plus an optional low-severity diagnostic
///
/// The value is always usable; when the input could not be parsed it holds
/// the field's default and `diagnostic` says why.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParse<T> {
    pub value: T,
    pub diagnostic: Option<String>,
}

impl<T> FieldParse<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    fn fallback(value: T, diagnostic: String) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Parses an offer count, keeping only the digits of the text
///
/// `"1,204 offers"` → 1204. Empty or overflowing input yields 0.
pub fn parse_offers(text: &str) -> FieldParse<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return FieldParse::fallback(0, format!("no digits in offers text '{}'", text));
    }

    match digits.parse::<u64>() {
        Ok(value) => FieldParse::ok(value),
        Err(e) => FieldParse::fallback(0, format!("offers '{}': {}", text, e)),
    }
}

/// Parses a price, keeping only digits and decimal points of the text
///
/// `"$4.56 USD"` → 4.56. The longest leading `digits[.digits]` run of the
/// cleaned text is used, so `"4.56 (0.5%)"` → 4.56 and `"1.2.3"` → 1.2.
/// Input without a leading number, or a non-finite one, yields 0.0.
pub fn parse_price(text: &str) -> FieldParse<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return FieldParse::fallback(0.0, format!("no digits in price text '{}'", text));
    }

    let number = leading_number(&cleaned);
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return FieldParse::fallback(0.0, format!("no number in price text '{}'", text));
    }

    match number.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            FieldParse::fallback(0.0, format!("price '{}' is out of range", text))
        }
        Ok(value) if number.len() < cleaned.len() => FieldParse::fallback(
            value,
            format!("price '{}': ignored trailing '{}'", text, &cleaned[number.len()..]),
        ),
        Ok(value) => FieldParse::ok(value),
        Err(e) => FieldParse::fallback(0.0, format!("price '{}': {}", text, e)),
    }
}

/// Longest prefix of `cleaned` shaped like `digits[.digits]`
///
/// `cleaned` holds only ASCII digits and dots.
fn leading_number(cleaned: &str) -> &str {
    let mut seen_dot = false;
    let end = cleaned
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' {
                if seen_dot {
                    return true;
                }
                seen_dot = true;
            }
            false
        })
        .map_or(cleaned.len(), |(i, _)| i);
    &cleaned[..end]
}

/// Turns a fetched document into raw records
///
/// Implementations run on the blocking pool. A panic is reported by the
/// refresh as an extraction fault.
pub trait Extract: Send + Sync {
    fn extract(&self, document: &[u8]) -> Vec<RawRecord>;
}

/// Extracts raw records from listing markup
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: CardSelectors,
}

impl Extractor {
    pub fn new(selectors: CardSelectors) -> Self {
        Self { selectors }
    }

    /// Builds an extractor from the `[selectors]` config section
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(CardSelectors::from_config(config)?))
    }

    /// Extracts every usable card from a raw document
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Cards come back in
    /// document order.
    ///
    /// # Example
    ///
    /// ```
    /// use pricewatch::config::SelectorConfig;
    /// use pricewatch::pipeline::Extractor;
    ///
    /// let html = r#"<div class="product-card-wrapper">
    ///     <span class="product-title">EU Central 1</span>
    ///     <span class="price-amount">$4.56</span>
    /// </div>"#;
    /// let extractor = Extractor::from_config(&SelectorConfig::default()).unwrap();
    /// let records = extractor.extract(html.as_bytes());
    /// assert_eq!(records[0].server_label, "EU Central 1");
    /// ```
    pub fn extract(&self, document: &[u8]) -> Vec<RawRecord> {
        let html = String::from_utf8_lossy(document);
        let document = Html::parse_document(&html);

        let mut records = Vec::new();
        let mut dropped = 0usize;

        let cards = document
            .select(&self.selectors.card)
            .filter(|card| !self.inside_card(*card));

        for (index, card) in cards.enumerate() {
            match self.extract_card(index, card) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        tracing::debug!(
            "Extracted {} cards ({} dropped without label or price)",
            records.len(),
            dropped
        );

        records
    }

    /// Whether an ancestor of `element` already matched the card selector
    ///
    /// Fragment matching also hits inner elements such as
    /// `product-card-wrapper__inner`; only the outermost match is a card.
    fn inside_card(&self, element: ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.selectors.card.matches(&ancestor))
    }

    fn extract_card(&self, index: usize, card: ElementRef<'_>) -> Option<RawRecord> {
        let label = first_text(card, &self.selectors.title);
        let price_text = first_text(card, &self.selectors.price);

        if label.is_none() && price_text.is_none() {
            tracing::debug!("Card {}: no label and no price, dropping", index);
            return None;
        }

        let offers_text = first_text(card, &self.selectors.offers).unwrap_or_default();
        let offers = parse_offers(&offers_text);
        let price = parse_price(price_text.as_deref().unwrap_or_default());

        for diagnostic in [&offers.diagnostic, &price.diagnostic].into_iter().flatten() {
            tracing::debug!("Card {}: {}", index, diagnostic);
        }

        Some(RawRecord::new(
            label.unwrap_or_default(),
            offers.value,
            price.value,
        ))
    }
}

impl Extract for Extractor {
    fn extract(&self, document: &[u8]) -> Vec<RawRecord> {
        Extractor::extract(self, document)
    }
}

/// Trimmed text of the first element matching `selector` under `scope`
///
/// Returns `None` if nothing matches or the text is blank.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}
