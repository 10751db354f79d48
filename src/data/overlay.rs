//! Lazily materialized per-object overrides.

/// A private array of per-object values that shadows a wrapped dataset.
///
/// An overlay starts absent: reads return `None` and the caller falls through
/// to the wrapped data. [`materialize_with`](Self::materialize_with) creates it
/// once from a snapshot, after which it can be written. It is never shared.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay<T> {
    values: Option<Vec<T>>,
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Self { values: None }
    }
}

impl<T: Copy> Overlay<T> {
    /// Create an absent overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the overlay has been materialized.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.values.is_some()
    }

    /// Number of slots, 0 while absent.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if absent or empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overridden value at `position`, `None` while absent.
    ///
    /// # Panics
    ///
    /// Panics if active and `position >= len()`.
    #[inline]
    pub fn get(&self, position: usize) -> Option<T> {
        self.values.as_ref().map(|v| v[position])
    }

    /// Materialize the overlay with `len` values taken from `snapshot` if it is
    /// absent, then return it for writing. Does nothing to an active overlay.
    pub fn materialize_with(&mut self, len: usize, snapshot: impl FnMut(usize) -> T) -> &mut [T] {
        self.values
            .get_or_insert_with(|| (0..len).map(snapshot).collect())
            .as_mut_slice()
    }

    /// Swap two slots if active.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        if let Some(values) = self.values.as_mut() {
            values.swap(a, b);
        }
    }

    /// Drop the overlay, reverting to pass-through reads.
    #[inline]
    pub fn reset(&mut self) {
        self.values = None;
    }
}
