use std::fmt;

/// Prices above this magnitude are sales, at or below it rents
///
/// Values are taken as quoted by the sites (EUR); no currency conversion
/// is attempted.
pub const SALE_PRICE_THRESHOLD: u64 = 10_000;

/// A cleaned-up price: display text plus the magnitude used for inference
///
/// For a range, `display` is `"min - max"` and `magnitude` is the minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPrice {
    pub display: String,
    pub magnitude: u64,
}

/// Normalizes a raw price string
///
/// Accepts a single price token (`"415 000 €"`) or a two-token range
/// (`"30 000 € - 113 000 €"`). Currency symbols, whitespace and grouping
/// separators are stripped; a trailing one- or two-digit decimal part is
/// dropped. Strings without any digits yield `None`.
///
/// # Example
///
/// ```
/// use immoharvest::normalize::normalize_price;
///
/// let price = normalize_price("30 000 € - 113 000 €").unwrap();
/// assert_eq!(price.display, "30000 - 113000");
/// assert_eq!(price.magnitude, 30000);
/// ```
pub fn normalize_price(raw: &str) -> Option<NormalizedPrice> {
    let amounts: Vec<u64> = raw.split('-').filter_map(parse_amount).collect();

    match amounts[..] {
        [] => None,
        [single] => Some(NormalizedPrice {
            display: single.to_string(),
            magnitude: single,
        }),
        // The sites quote ranges low-to-high; the first token is the minimum
        [min, max, ..] => Some(NormalizedPrice {
            display: format!("{} - {}", min, max),
            magnitude: min,
        }),
    }
}

/// Parses one price token into its integer amount
fn parse_amount(segment: &str) -> Option<u64> {
    // Keep digits and in-number separators, dropping currency and labels
    let numeric: String = segment
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let numeric = numeric.trim_matches(|c| c == '.' || c == ',');

    if numeric.is_empty() {
        return None;
    }

    // One or two digits after the last separator form a decimal part and
    // are dropped; a three-digit tail is a grouping separator
    let main = match numeric.rfind(|c| c == '.' || c == ',') {
        Some(idx) if numeric.len() - idx - 1 < 3 => &numeric[..idx],
        _ => numeric,
    };

    let digits: String = main.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// Transaction category: sale, rent, or whatever the site declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    Sale,
    Rent,
    /// A site label that maps to neither sale nor rent, kept verbatim
    Declared(String),
}

impl TransactionType {
    /// Maps a site's explicit transaction label to a category
    ///
    /// Known labels collapse to `Sale`/`Rent`; anything else is kept as
    /// declared so no site signal is ever silently discarded.
    pub fn from_site_label(label: &str) -> TransactionType {
        let lowered = label.trim().to_lowercase();
        match lowered.as_str() {
            "buy" | "sale" | "acheter" | "vente" | "kaufen" => TransactionType::Sale,
            "rent" | "louer" | "location" | "mieten" => TransactionType::Rent,
            _ => TransactionType::Declared(lowered),
        }
    }

    /// Infers the category from a price magnitude
    ///
    /// Strictly above [`SALE_PRICE_THRESHOLD`] is a sale, everything else a
    /// rent. Only used for sources without an explicit site label.
    pub fn infer_from_magnitude(magnitude: u64) -> TransactionType {
        if magnitude > SALE_PRICE_THRESHOLD {
            TransactionType::Sale
        } else {
            TransactionType::Rent
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Sale => write!(f, "sale"),
            TransactionType::Rent => write!(f, "rent"),
            TransactionType::Declared(label) => write!(f, "{}", label),
        }
    }
}
