/// A small group-by module, folding rows into per-key reductions the way the statistic
/// tables need them.
use indexmap::IndexMap;
use statrs::statistics::Statistics;
use std::hash::Hash;

/// Running reduction of the rows of one group.
pub trait Reducer<T>: Default {
    fn accumulate(&mut self, item: &T);
}

/// Group `items` by the key extracted with `key`, folding each group with the reducer `R`.
///
/// Groups are returned sorted by key, so the result does not depend on the order of
/// `items` (beyond the floating point order of summation within a group).
pub fn group_by<T, K, R>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> IndexMap<K, R>
where
    K: Hash + Eq + Ord,
    R: Reducer<T>,
{
    let mut groups: IndexMap<K, R> = IndexMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().accumulate(&item);
    }
    groups.sort_keys();
    groups
}

/// Sums a single value per row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sum(pub f64);

impl<K> Reducer<(K, f64)> for Sum {
    fn accumulate(&mut self, item: &(K, f64)) {
        self.0 += item.1;
    }
}

/// Collects values in order to take their mean.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mean(Vec<f64>);

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    /// Return the mean of the collected values, NaN if there are none.
    pub fn value(&self) -> f64 {
        self.0.iter().mean()
    }
}

impl<K> Reducer<(K, f64)> for Mean {
    fn accumulate(&mut self, item: &(K, f64)) {
        self.push(item.1);
    }
}

/// Whether any of the values is NaN or infinite, used to drop invalid rows before grouping.
pub fn any_non_finite(values: &[f64]) -> bool {
    values.iter().any(|value| !value.is_finite())
}
