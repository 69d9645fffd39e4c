use std::fmt;

/// Canonical property categories, derived from listing-name keywords
///
/// The variants carry the site keyword they are recognized by; exporting a
/// category writes that keyword back out. Classification order follows
/// [`PropertyType::all`], which is significant: a name mentioning several
/// keywords gets the earliest one in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    House,
    Apartment,
    Room,
    Studio,
    Penthouse,
    Duplex,
    Triplex,
    Loft,
    Attic,
    GroundFloor,
    NewDevelopment,
    Residence,
    Subdivision,
    Land,
    Garage,
    Office,
    Retail,
    Storefront,
    Restaurant,
    Hotel,
    Warehouse,
    Farm,
}

impl PropertyType {
    /// The listing keyword this category is recognized by (and exported as)
    pub fn keyword(&self) -> &'static str {
        match self {
            PropertyType::House => "maison",
            PropertyType::Apartment => "appartement",
            PropertyType::Room => "chambre",
            PropertyType::Studio => "studio",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Duplex => "duplex",
            PropertyType::Triplex => "triplex",
            PropertyType::Loft => "loft",
            PropertyType::Attic => "mansarde",
            PropertyType::GroundFloor => "rez-de-chaussée",
            PropertyType::NewDevelopment => "projet neuf",
            PropertyType::Residence => "résidence",
            PropertyType::Subdivision => "lotissement",
            PropertyType::Land => "terrain",
            PropertyType::Garage => "garage",
            PropertyType::Office => "bureau",
            PropertyType::Retail => "commerce",
            PropertyType::Storefront => "local",
            PropertyType::Restaurant => "restaurant",
            PropertyType::Hotel => "hôtel",
            PropertyType::Warehouse => "entrepôt",
            PropertyType::Farm => "exploitation agricole",
        }
    }

    /// All categories in classification priority order
    pub fn all() -> &'static [PropertyType] {
        &[
            PropertyType::House,
            PropertyType::Apartment,
            PropertyType::Room,
            PropertyType::Studio,
            PropertyType::Penthouse,
            PropertyType::Duplex,
            PropertyType::Triplex,
            PropertyType::Loft,
            PropertyType::Attic,
            PropertyType::GroundFloor,
            PropertyType::NewDevelopment,
            PropertyType::Residence,
            PropertyType::Subdivision,
            PropertyType::Land,
            PropertyType::Garage,
            PropertyType::Office,
            PropertyType::Retail,
            PropertyType::Storefront,
            PropertyType::Restaurant,
            PropertyType::Hotel,
            PropertyType::Warehouse,
            PropertyType::Farm,
        ]
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Classifies a listing name into a property category
///
/// Scans the name case-insensitively for each keyword in priority order;
/// the first hit wins. Names without any keyword yield `None`.
///
/// # Example
///
/// ```
/// use immoharvest::normalize::{classify_property_type, PropertyType};
///
/// let kind = classify_property_type("Appartement neuf avec maison d'amis");
/// assert_eq!(kind, Some(PropertyType::House));
/// ```
pub fn classify_property_type(name: &str) -> Option<PropertyType> {
    let lowered = name.to_lowercase();

    PropertyType::all()
        .iter()
        .copied()
        .find(|kind| lowered.contains(kind.keyword()))
}
