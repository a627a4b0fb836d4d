//! Offset/length keyed map whose ranges either nest or are disjoint
//!
//! Used for the document's comment and highlight annotations. Ranges may be
//! nested to any depth but two ranges may never partially overlap, so every
//! offset has a well-defined chain of enclosing ranges.

/// A byte range key in a [`NestedOffsetLengthMap`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NestedRange {
    pub offset: u64,
    pub length: u64,
}

impl NestedRange {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// One past the last byte covered by this range
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Whether `offset` falls inside this range (zero-length ranges contain nothing)
    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// Whether `other` lies entirely within this range
    pub fn encloses(&self, other: &NestedRange) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }

    fn partially_overlaps(&self, other: &NestedRange) -> bool {
        let overlaps = self.offset < other.end() && other.offset < self.end();
        overlaps && !self.encloses(other) && !other.encloses(self)
    }
}

/// Sorted map of nested ranges to values
///
/// Entries are ordered by offset ascending, then by length descending, so an
/// enclosing range always sorts before the ranges nested inside it.
#[derive(Clone, Debug)]
pub struct NestedOffsetLengthMap<T> {
    entries: Vec<(NestedRange, T)>,
    /// Upper bound on the length of any entry
    longest: u64,
}

impl<T> Default for NestedOffsetLengthMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            longest: 0,
        }
    }
}

impl<T> NestedOffsetLengthMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion point for `key` under the (offset asc, length desc) ordering
    fn search(&self, key: &NestedRange) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| {
            k.offset
                .cmp(&key.offset)
                .then_with(|| key.length.cmp(&k.length))
        })
    }

    /// Insert or replace the value for a range
    ///
    /// Returns false (leaving the map untouched) if the range would partially
    /// overlap an existing one.
    #[must_use = "returns whether the range was accepted"]
    pub fn set(&mut self, offset: u64, length: u64, value: T) -> bool {
        let key = NestedRange::new(offset, length);

        if self.entries.iter().any(|(k, _)| k.partially_overlaps(&key)) {
            return false;
        }

        match self.search(&key) {
            Ok(index) => self.entries[index].1 = value,
            Err(index) => self.entries.insert(index, (key, value)),
        }
        self.longest = self.longest.max(length);

        true
    }

    /// Get the value stored for exactly this range
    pub fn get(&self, offset: u64, length: u64) -> Option<&T> {
        let key = NestedRange::new(offset, length);
        self.search(&key).ok().map(|index| &self.entries[index].1)
    }

    /// Remove the value stored for exactly this range
    pub fn remove(&mut self, offset: u64, length: u64) -> Option<T> {
        let key = NestedRange::new(offset, length);
        match self.search(&key) {
            Ok(index) => Some(self.entries.remove(index).1),
            Err(_) => None,
        }
    }

    /// Entries that start close enough before `offset` to cover it
    fn candidates(&self, offset: u64) -> &[(NestedRange, T)] {
        let end = self.entries.partition_point(|(k, _)| k.offset <= offset);
        let start = self.entries[..end]
            .partition_point(|(k, _)| k.offset.saturating_add(self.longest) <= offset);
        &self.entries[start..end]
    }

    /// The innermost range covering `offset`
    pub fn get_innermost(&self, offset: u64) -> Option<(NestedRange, &T)> {
        // Walking backwards visits deeper ranges before their parents
        self.candidates(offset)
            .iter()
            .rev()
            .find(|(k, _)| k.contains_offset(offset))
            .map(|(k, v)| (*k, v))
    }

    /// Every range covering `offset`, outermost first
    pub fn get_all(&self, offset: u64) -> Vec<(NestedRange, &T)> {
        self.candidates(offset)
            .iter()
            .filter(|(k, _)| k.contains_offset(offset))
            .map(|(k, v)| (*k, v))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NestedRange, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Adjust keys after `length` bytes were inserted at `offset`
    ///
    /// Ranges starting at or after the insertion point move right; ranges
    /// spanning it grow.
    pub fn data_inserted(&mut self, offset: u64, length: u64) {
        for (key, _) in &mut self.entries {
            if key.offset >= offset {
                key.offset += length;
            } else if key.end() > offset {
                key.length += length;
            }
        }

        self.resort();
    }

    /// Adjust keys after `length` bytes were erased at `offset`
    ///
    /// Non-empty ranges wholly inside the erased span are dropped, ranges
    /// overlapping it shrink, ranges after it move left.
    pub fn data_erased(&mut self, offset: u64, length: u64) {
        let erase = NestedRange::new(offset, length);
        let erase_end = erase.end();

        if length == 0 {
            return;
        }

        self.entries
            .retain(|(key, _)| !(key.length > 0 && erase.encloses(key)));

        for (key, _) in &mut self.entries {
            if key.offset >= erase_end {
                key.offset -= length;
            } else if key.end() > offset {
                let overlap_start = key.offset.max(offset);
                let overlap_end = key.end().min(erase_end);
                let overlap = overlap_end.saturating_sub(overlap_start);

                // Zero-length ranges inside the erased span collapse onto its start
                key.offset = key.offset.min(offset);
                key.length -= overlap;
            }
        }

        self.resort();
    }

    fn resort(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| {
            a.offset.cmp(&b.offset).then_with(|| b.length.cmp(&a.length))
        });
        self.entries.dedup_by(|(a, _), (b, _)| a == b);
        self.longest = self.entries.iter().map(|(k, _)| k.length).max().unwrap_or(0);
    }
}
