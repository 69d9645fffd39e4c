use serde_json::{Map, Value};

/// Icon classes and the canonical characteristic each one names
const ICON_KEYS: &[(&str, &str)] = &[
    ("icon-agency_area02", "Surface"),
    ("icon-agency_bed02", "Bedrooms"),
    ("icon-agency_room", "Rooms"),
];

/// Native table labels recognized as characteristics, kept verbatim
const NATIVE_KEYS: &[&str] = &["Superficie totale", "Chambres", "Pièces"];

/// Keys holding the property's total area
const AREA_KEYS: &[&str] = &["Surface", "Superficie totale"];

/// An ordered characteristic mapping (key → value, insertion order kept)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characteristics(Vec<(String, String)>);

impl Characteristics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Inserts a key, overwriting the value in place when the key repeats
    /// (position keeps the first occurrence)
    pub fn insert(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.0.push((key.to_string(), value.to_string()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The total area with unit suffix and surrounding whitespace stripped
    ///
    /// `"85 m²"` becomes `"85"`. Absent when no area key is present.
    pub fn area(&self) -> Option<String> {
        AREA_KEYS.iter().find_map(|key| {
            self.get(key).map(|value| {
                let value = value.trim();
                value.strip_suffix("m²").unwrap_or(value).trim().to_string()
            })
        })
    }

    /// Serializes to a JSON object string, key order preserved
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        for (key, value) in &self.0 {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map).to_string()
    }
}

/// Canonicalizes raw (icon-class-or-label, text) pairs
///
/// An icon-class key containing a known icon name maps to its canonical
/// characteristic; a key equal to a recognized native table label is kept
/// as-is; everything else is dropped. Pair order is preserved.
pub fn canonicalize_characteristics(pairs: &[(String, String)]) -> Characteristics {
    let mut characteristics = Characteristics::new();

    for (raw_key, value) in pairs {
        let canonical = ICON_KEYS
            .iter()
            .find(|(icon, _)| raw_key.contains(icon))
            .map(|(_, name)| *name)
            .or_else(|| NATIVE_KEYS.iter().find(|k| *k == raw_key).copied());

        if let Some(key) = canonical {
            characteristics.insert(key, value);
        }
    }

    characteristics
}
