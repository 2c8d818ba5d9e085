//! Sorted sparse labelset.

use super::Labelset;

/// A labelset backed by a vector of `(label, probability)` pairs kept sorted
/// by label.
///
/// This is the persisted per-vertex representation: after the cutoff a vertex
/// rarely carries more than a handful of labels, so the sorted vector is both
/// compact and cheap to clone between iteration buffers. Sorted keys make the
/// subset test a merge walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseLabelset {
    entries: Vec<(usize, f64)>,
}

impl SparseLabelset {
    /// Create an empty labelset.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create a labelset holding the single entry `(k, v)`.
    pub fn singleton(k: usize, v: f64) -> Self {
        Self { entries: vec![(k, v)] }
    }

    /// Iterate entries in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    fn position(&self, k: usize) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&k, |&(key, _)| key)
    }

    /// Append an entry whose key is larger than any key present.
    pub(crate) fn push(&mut self, k: usize, v: f64) {
        debug_assert!(self.entries.last().map_or(true, |&(last, _)| last < k));
        self.entries.push((k, v));
    }

    /// Key-subset test against another sorted labelset.
    ///
    /// Both operands are sorted by label, so a single merge walk decides the
    /// question in `O(|self| + |other|)`.
    pub fn is_subset(&self, other: &SparseLabelset) -> bool {
        let mut it = other.entries.iter();
        'outer: for &(k, _) in &self.entries {
            for &(ok, _) in it.by_ref() {
                if ok == k {
                    continue 'outer;
                }
                if ok > k {
                    return false;
                }
            }
            return false;
        }
        true
    }
}

impl Labelset for SparseLabelset {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn has(&self, k: usize) -> bool {
        self.position(k).is_ok()
    }

    fn get(&self, k: usize) -> Option<f64> {
        self.position(k).ok().map(|i| self.entries[i].1)
    }

    fn set(&mut self, k: usize, v: f64) {
        match self.position(k) {
            Ok(i) => self.entries[i].1 = v,
            Err(i) => self.entries.insert(i, (k, v)),
        }
    }

    fn add(&mut self, k: usize, v: f64) {
        match self.position(k) {
            Ok(i) => self.entries[i].1 += v,
            Err(i) => self.entries.insert(i, (k, v)),
        }
    }

    fn remove(&mut self, k: usize) {
        if let Ok(i) = self.position(k) {
            self.entries.remove(i);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn for_each(&self, mut f: impl FnMut(usize, f64)) {
        for &(k, v) in &self.entries {
            f(k, v);
        }
    }

    fn for_each_value(&mut self, mut f: impl FnMut(&mut f64)) {
        for (_, v) in &mut self.entries {
            f(v);
        }
    }

    fn retain_values(&mut self, mut pred: impl FnMut(f64) -> bool) {
        self.entries.retain(|&(_, v)| pred(v));
    }
}
