//! Insertion-ordered string cache with case-insensitive lookup
//!
//! Holds the last SD card directory listing so that a later file select can
//! be normalized to the card's own spelling of the name. Allocation failures
//! are reported instead of aborting, and never leave a partial entry behind.

use x3gbridge_core::TableError;

/// Default growth chunk, in entries
pub const DEFAULT_CHUNK: usize = 10;

/// An owned, growable list of strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    entries: Vec<String>,
    chunk: usize,
}

impl StringTable {
    /// Create an empty table with room for at least `initial_capacity`
    /// entries; later growth happens in chunks of the same size.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self, TableError> {
        let chunk = initial_capacity.max(1);
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(chunk)
            .map_err(|_| TableError::AllocationFailed { requested: chunk })?;
        Ok(Self { entries, chunk })
    }

    /// Copy `s` onto the end of the table
    pub fn add(&mut self, s: &str) -> Result<(), TableError> {
        let requested = self.entries.len() + 1;
        if self.entries.len() == self.entries.capacity() {
            self.entries
                .try_reserve_exact(self.chunk)
                .map_err(|_| TableError::AllocationFailed { requested })?;
        }

        let mut owned = String::new();
        owned
            .try_reserve_exact(s.len())
            .map_err(|_| TableError::AllocationFailed { requested })?;
        owned.push_str(s);
        self.entries.push(owned);
        Ok(())
    }

    /// Delete the entry at `index`, shifting later entries left.
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    /// Position of the first entry equal to `s` ignoring ASCII case
    pub fn find_case_insensitive(&self, s: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.eq_ignore_ascii_case(s))
    }

    /// Release every entry and the backing storage
    pub fn clear(&mut self) {
        self.entries = Vec::new();
    }

    /// Clear, then reserve the initial chunk again
    pub fn reinitialize(&mut self) -> Result<(), TableError> {
        self.clear();
        self.entries
            .try_reserve_exact(self.chunk)
            .map_err(|_| TableError::AllocationFailed {
                requested: self.chunk,
            })
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reserved room, in entries
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            chunk: DEFAULT_CHUNK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_insensitive_select_round_trip() {
        let mut table = StringTable::with_capacity(DEFAULT_CHUNK).unwrap();
        table.add("PART.gcode").unwrap();
        assert_eq!(table.find_case_insensitive("part.gcode"), Some(0));
        table.remove(0);
        assert_eq!(table.find_case_insensitive("part.gcode"), None);
    }

    #[test]
    fn test_duplicates_are_kept_and_first_wins() {
        let mut table = StringTable::with_capacity(2).unwrap();
        table.add("a.g").unwrap();
        table.add("B.G").unwrap();
        table.add("b.g").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.find_case_insensitive("B.g"), Some(1));
    }

    #[test]
    fn test_remove_out_of_range_is_a_no_op() {
        let mut table = StringTable::with_capacity(4).unwrap();
        table.add("one").unwrap();
        table.remove(5);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["one"]);
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut table = StringTable::with_capacity(4).unwrap();
        for name in ["a", "b", "c"] {
            table.add(name).unwrap();
        }
        table.remove(1);
        assert_eq!(table.get(1), Some("c"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_grows_past_initial_chunk() {
        let mut table = StringTable::with_capacity(2).unwrap();
        for i in 0..25 {
            table.add(&format!("file{}.x3g", i)).unwrap();
        }
        assert_eq!(table.len(), 25);
        assert!(table.capacity() >= 25);
        assert_eq!(table.get(24), Some("file24.x3g"));
    }

    #[test]
    fn test_clear_and_reinitialize() {
        let mut table = StringTable::with_capacity(3).unwrap();
        table.add("x").unwrap();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
        table.reinitialize().unwrap();
        assert!(table.capacity() >= 3);
    }

    proptest! {
        #[test]
        fn prop_every_added_name_is_found(names in proptest::collection::vec("[A-Za-z0-9]{1,12}", 0..40)) {
            let mut table = StringTable::with_capacity(DEFAULT_CHUNK).unwrap();
            for name in &names {
                table.add(name).unwrap();
            }
            prop_assert_eq!(table.len(), names.len());
            for name in &names {
                let found = table.find_case_insensitive(&name.to_ascii_uppercase());
                prop_assert!(found.is_some());
                let index = found.unwrap();
                prop_assert!(table.get(index).unwrap().eq_ignore_ascii_case(name));
            }
        }
    }
}
