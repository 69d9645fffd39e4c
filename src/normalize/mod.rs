//! Field normalization
//!
//! Pure functions that canonicalize the raw strings an extraction profile
//! harvested:
//! - listing name → property category (ordered keyword scan)
//! - price text → cleaned display string + magnitude
//! - site label or magnitude → transaction type
//! - raw characteristic pairs → canonical ordered mapping, total area
//!
//! Nothing here touches the network or the DOM; everything is testable with
//! plain strings.

mod characteristics;
mod price;
mod property_type;

pub use characteristics::{canonicalize_characteristics, Characteristics};
pub use price::{normalize_price, NormalizedPrice, TransactionType, SALE_PRICE_THRESHOLD};
pub use property_type::{classify_property_type, PropertyType};
