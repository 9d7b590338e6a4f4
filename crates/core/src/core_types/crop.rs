//! Crop and nutrient identifiers
//!
//! The engine supports two crops of the middle Yangtze rice-wheat rotation.
//! Nutrients are the three macro nutrients; phosphorus and potassium are
//! expressed as their oxide equivalents (P2O5, K2O) everywhere in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported crop types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    /// Single-season paddy rice
    Rice,
    /// Winter wheat
    Wheat,
}

impl CropType {
    /// All supported crops
    pub const ALL: [CropType; 2] = [CropType::Rice, CropType::Wheat];

    /// Lowercase identifier used in requests and feature files
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Rice => "rice",
            CropType::Wheat => "wheat",
        }
    }

    /// Friendly name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            CropType::Rice => "Rice",
            CropType::Wheat => "Wheat",
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a crop label is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCropLabel(pub String);

impl FromStr for CropType {
    type Err = UnknownCropLabel;

    /// Accepts English labels in any case and the Chinese labels used by
    /// the regional feature datasets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        match label.to_ascii_lowercase().as_str() {
            "rice" | "水稻" | "稻" => Ok(CropType::Rice),
            "wheat" | "小麦" | "麦" => Ok(CropType::Wheat),
            _ => Err(UnknownCropLabel(label.to_string())),
        }
    }
}

/// Macro nutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    /// Nitrogen (N)
    N,
    /// Phosphorus (as P2O5)
    P,
    /// Potassium (as K2O)
    K,
}

impl Nutrient {
    /// All nutrients in canonical order
    pub const ALL: [Nutrient; 3] = [Nutrient::N, Nutrient::P, Nutrient::K];

    /// Position in canonical order
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Nutrient::N => 0,
            Nutrient::P => 1,
            Nutrient::K => 2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::N => "N",
            Nutrient::P => "P2O5",
            Nutrient::K => "K2O",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One value per nutrient
///
/// Replaces string-keyed maps: every per-nutrient table in the engine is a
/// `NutrientTriple` indexed by [`Nutrient`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientTriple<T> {
    #[serde(rename = "N")]
    pub n: T,
    #[serde(rename = "P")]
    pub p: T,
    #[serde(rename = "K")]
    pub k: T,
}

impl<T> NutrientTriple<T> {
    pub const fn new(n: T, p: T, k: T) -> Self {
        Self { n, p, k }
    }

    /// Build a triple by evaluating `f` for N, P and K in that order
    pub fn from_fn(mut f: impl FnMut(Nutrient) -> T) -> Self {
        let n = f(Nutrient::N);
        let p = f(Nutrient::P);
        let k = f(Nutrient::K);
        Self { n, p, k }
    }

    #[inline]
    pub fn get(&self, nutrient: Nutrient) -> &T {
        match nutrient {
            Nutrient::N => &self.n,
            Nutrient::P => &self.p,
            Nutrient::K => &self.k,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, nutrient: Nutrient) -> &mut T {
        match nutrient {
            Nutrient::N => &mut self.n,
            Nutrient::P => &mut self.p,
            Nutrient::K => &mut self.k,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Nutrient, &T) -> U) -> NutrientTriple<U> {
        NutrientTriple {
            n: f(Nutrient::N, &self.n),
            p: f(Nutrient::P, &self.p),
            k: f(Nutrient::K, &self.k),
        }
    }

    /// Iterate `(nutrient, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, &T)> {
        Nutrient::ALL.into_iter().map(move |n| (n, self.get(n)))
    }
}

impl<T: Copy> NutrientTriple<T> {
    /// Same value for every nutrient
    pub const fn splat(value: T) -> Self {
        Self {
            n: value,
            p: value,
            k: value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_labels() {
        assert_eq!("rice".parse::<CropType>(), Ok(CropType::Rice));
        assert_eq!(" Wheat ".parse::<CropType>(), Ok(CropType::Wheat));
        assert_eq!("水稻".parse::<CropType>(), Ok(CropType::Rice));
        assert_eq!("小麦".parse::<CropType>(), Ok(CropType::Wheat));
        assert!("maize".parse::<CropType>().is_err());
    }

    #[test]
    fn test_triple_access() {
        let mut t = NutrientTriple::new(1.0, 2.0, 3.0);
        assert_eq!(*t.get(Nutrient::P), 2.0);
        *t.get_mut(Nutrient::K) += 1.0;
        assert_eq!(t.k, 4.0);

        let doubled = t.map(|_, v| v * 2.0);
        assert_eq!(doubled, NutrientTriple::new(2.0, 4.0, 8.0));

        let order: Vec<Nutrient> = t.iter().map(|(n, _)| n).collect();
        assert_eq!(order, Nutrient::ALL.to_vec());
    }

    #[test]
    fn test_triple_serde_keys() {
        let json = serde_json::to_string(&NutrientTriple::new(1, 2, 3)).unwrap();
        assert_eq!(json, r#"{"N":1,"P":2,"K":3}"#);
    }
}
