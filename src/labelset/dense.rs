//! Dense scratch accumulator.

use super::{Labelset, SparseLabelset};

/// A labelset tuned for the combine phase of one vertex update.
///
/// Values live in an array indexed by label, so increments are constant time
/// regardless of how many neighbor labelsets are merged. A touched-key list
/// keeps `clear` and traversal proportional to the entries actually present,
/// which lets one accumulator be reused across every vertex of a sweep.
#[derive(Debug, Clone)]
pub struct DenseAccumulator {
    values: Vec<f64>,
    touched: Vec<bool>,
    keys: Vec<usize>,
}

impl DenseAccumulator {
    /// Create an accumulator for labels in `[0, span)`.
    pub fn new(span: usize) -> Self {
        Self {
            values: vec![0.0; span],
            touched: vec![false; span],
            keys: Vec::new(),
        }
    }

    /// One past the largest admissible label.
    pub fn span(&self) -> usize {
        self.values.len()
    }

    /// Move the accumulated entries into `out` in ascending label order,
    /// leaving the accumulator empty and ready for the next vertex.
    pub fn drain_into(&mut self, out: &mut SparseLabelset) {
        self.keys.sort_unstable();
        out.clear();
        for &k in &self.keys {
            out.push(k, self.values[k]);
            self.values[k] = 0.0;
            self.touched[k] = false;
        }
        self.keys.clear();
    }
}

impl Labelset for DenseAccumulator {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn has(&self, k: usize) -> bool {
        self.touched[k]
    }

    fn get(&self, k: usize) -> Option<f64> {
        if self.touched[k] {
            Some(self.values[k])
        } else {
            None
        }
    }

    fn set(&mut self, k: usize, v: f64) {
        if !self.touched[k] {
            self.touched[k] = true;
            self.keys.push(k);
        }
        self.values[k] = v;
    }

    fn add(&mut self, k: usize, v: f64) {
        if !self.touched[k] {
            self.touched[k] = true;
            self.keys.push(k);
        }
        self.values[k] += v;
    }

    fn remove(&mut self, k: usize) {
        if self.touched[k] {
            self.touched[k] = false;
            self.values[k] = 0.0;
            self.keys.retain(|&key| key != k);
        }
    }

    fn clear(&mut self) {
        for &k in &self.keys {
            self.values[k] = 0.0;
            self.touched[k] = false;
        }
        self.keys.clear();
    }

    fn for_each(&self, mut f: impl FnMut(usize, f64)) {
        for &k in &self.keys {
            f(k, self.values[k]);
        }
    }

    fn for_each_value(&mut self, mut f: impl FnMut(&mut f64)) {
        for &k in &self.keys {
            f(&mut self.values[k]);
        }
    }

    fn retain_values(&mut self, mut pred: impl FnMut(f64) -> bool) {
        let values = &mut self.values;
        let touched = &mut self.touched;
        self.keys.retain(|&k| {
            if pred(values[k]) {
                true
            } else {
                values[k] = 0.0;
                touched[k] = false;
                false
            }
        });
    }

    // Fused scale + inflate + relative cutoff in two passes over the
    // touched keys.
    fn finalize(&mut self, m: f64, e: f64, th: f64) {
        let mut vmax = 0.0f64;
        for &k in &self.keys {
            let v = (self.values[k] * m).powf(e);
            self.values[k] = v;
            if v > vmax {
                vmax = v;
            }
        }
        let floor = th * vmax;
        self.retain_values(|v| v >= floor);
    }
}
