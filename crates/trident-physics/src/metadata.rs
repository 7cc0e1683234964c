//! The per-model power-balance ledger.
//!
//! Every source model reports one [`SourceMetadata`] entry with its
//! integrated scalar powers in watts. The composite aggregates entries into
//! a [`SourceMetadataCollection`], which is a value with a canonical empty
//! instance — consumers never see "no metadata", only "no entries", and
//! stay free of conditional branches.

/// Power-balance category of a source model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    /// D-T fusion (alpha heating).
    Fusion,
    /// Externally injected heating (ECRH and friends).
    Auxiliary,
    /// Ohmic dissipation.
    Ohmic,
    /// Radiative losses.
    Radiation,
    /// Ion–electron collisional exchange (net zero).
    Exchange,
    /// Anything else (particle and current sources).
    Other,
}

/// Integrated scalar powers of one source model, **in \[W\]**.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Model name.
    pub model: &'static str,
    /// Power-balance category.
    pub category: SourceCategory,
    /// Power delivered to ions.
    pub ion_power: f64,
    /// Power delivered to electrons (negative for losses).
    pub electron_power: f64,
    /// Alpha-particle heating power.
    pub alpha_power: f64,
    /// Radiated power (reported positive).
    pub radiation_power: f64,
    /// Ohmic dissipation power.
    pub ohmic_power: f64,
    /// Total fusion power (alphas plus neutrons).
    pub fusion_power: f64,
}

impl SourceMetadata {
    /// A zeroed entry for `model` in `category`.
    pub fn new(model: &'static str, category: SourceCategory) -> Self {
        Self {
            model,
            category,
            ion_power: 0.0,
            electron_power: 0.0,
            alpha_power: 0.0,
            radiation_power: 0.0,
            ohmic_power: 0.0,
            fusion_power: 0.0,
        }
    }

    /// Net heating power of this entry **in \[W\]**.
    pub fn total_power(&self) -> f64 {
        self.ion_power + self.electron_power
    }
}

/// An aggregation of [`SourceMetadata`] entries.
///
/// Aggregation is associative concatenation; every total below is a plain
/// sum over entries, so composite totals equal the sum of per-model values.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadataCollection {
    /// Entries in model declaration order.
    entries: Vec<SourceMetadata>,
}

impl SourceMetadataCollection {
    /// The canonical empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn push(&mut self, entry: SourceMetadata) {
        self.entries.push(entry);
    }

    /// Merges another collection into this one.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[SourceMetadata] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of ion powers **in \[W\]**.
    pub fn total_ion_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.ion_power).sum()
    }

    /// Sum of electron powers **in \[W\]**.
    pub fn total_electron_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.electron_power).sum()
    }

    /// Sum of alpha powers **in \[W\]**.
    pub fn total_alpha_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.alpha_power).sum()
    }

    /// Sum of fusion powers **in \[W\]**.
    pub fn total_fusion_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.fusion_power).sum()
    }

    /// Sum of ohmic powers **in \[W\]**.
    pub fn total_ohmic_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.ohmic_power).sum()
    }

    /// Sum of radiated powers **in \[W\]**.
    pub fn total_radiation_power(&self) -> f64 {
        self.entries.iter().map(|entry| entry.radiation_power).sum()
    }

    /// Net heating power of all entries in `category` **in \[W\]**.
    pub fn power_by_category(&self, category: SourceCategory) -> f64 {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .map(SourceMetadata::total_power)
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn entry(model: &'static str, category: SourceCategory, ion: f64, electron: f64) -> SourceMetadata {
        SourceMetadata {
            ion_power: ion,
            electron_power: electron,
            ..SourceMetadata::new(model, category)
        }
    }

    #[test]
    fn empty_collection_has_zero_totals() {
        let collection = SourceMetadataCollection::empty();
        assert!(collection.is_empty());
        assert_relative_eq!(collection.total_ion_power(), 0.0);
        assert_relative_eq!(collection.total_fusion_power(), 0.0);
    }

    #[test]
    fn totals_equal_per_model_sums() {
        let mut collection = SourceMetadataCollection::empty();
        collection.push(entry("a", SourceCategory::Auxiliary, 1e6, 2e6));
        collection.push(entry("b", SourceCategory::Ohmic, 0.0, 5e5));
        collection.push(entry("c", SourceCategory::Exchange, 3e5, -3e5));

        assert_relative_eq!(collection.total_ion_power(), 1.3e6);
        assert_relative_eq!(collection.total_electron_power(), 2.2e6);
        assert_relative_eq!(collection.power_by_category(SourceCategory::Exchange), 0.0);
        assert_relative_eq!(collection.power_by_category(SourceCategory::Auxiliary), 3e6);
    }

    #[test]
    fn merge_is_associative_on_totals() {
        let a = {
            let mut collection = SourceMetadataCollection::empty();
            collection.push(entry("a", SourceCategory::Fusion, 2e6, 8e6));
            collection
        };
        let b = {
            let mut collection = SourceMetadataCollection::empty();
            collection.push(entry("b", SourceCategory::Auxiliary, 1e6, 1e6));
            collection
        };
        let c = {
            let mut collection = SourceMetadataCollection::empty();
            collection.push(entry("c", SourceCategory::Radiation, 0.0, -4e6));
            collection
        };

        let mut left = a.clone();
        left.merge(b.clone());
        left.merge(c.clone());

        let mut right_tail = b;
        right_tail.merge(c);
        let mut right = a;
        right.merge(right_tail);

        assert_relative_eq!(left.total_ion_power(), right.total_ion_power());
        assert_relative_eq!(left.total_electron_power(), right.total_electron_power());
        assert_eq!(left.len(), right.len());
    }
}
