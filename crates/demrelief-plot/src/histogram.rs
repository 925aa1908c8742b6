//! Value distribution of a raster band.

/// Number of bins used when none is given.
pub const DEFAULT_BINS: usize = 10;

/// Equal-width histogram over `[min, max]`; the last bin includes `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Lower edge of the first bin.
    pub min: f32,
    /// Upper edge of the last bin.
    pub max: f32,
    /// Sample count per bin.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range.
    ///
    /// Returns `None` when there are no values or `bins` is zero.
    pub fn from_values(values: &[f32], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let (min, max) = values.iter().copied().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f32::min(lo, v), f32::max(hi, v))),
        })?;

        let mut counts = vec![0u64; bins];
        let width = (max - min) / bins as f32;
        for &v in values {
            let idx = if width > 0.0 {
                (((v - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        Some(Self { min, max, counts })
    }

    /// Total number of samples binned.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bin count.
    pub fn peak(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Lower and upper edge of bin `index`.
    pub fn bin_edges(&self, index: usize) -> (f32, f32) {
        let width = (self.max - self.min) / self.counts.len() as f32;
        (
            self.min + width * index as f32,
            self.min + width * (index + 1) as f32,
        )
    }
}
