//! In-memory byte document
//!
//! Holds the whole file in a `Vec<u8>` together with its comment and
//! highlight annotations. Insertions and erasures shift the annotations so
//! they keep covering the same bytes.

use super::{Document, DocumentError, HighlightColour, NestedOffsetLengthMap};

#[derive(Default)]
pub struct MemoryDocument {
    data: Vec<u8>,
    highlights: NestedOffsetLengthMap<HighlightColour>,
    comments: NestedOffsetLengthMap<String>,

    /// Whether the data has changed since it was loaded
    modified: bool,
}

impl MemoryDocument {
    /// Create a new document from file bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Get a reference to the current bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check if the data has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Record that the current bytes have been written out
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Attach a comment to a range; fails if it would partially overlap another comment
    #[must_use = "returns whether the comment was accepted"]
    pub fn set_comment(&mut self, offset: u64, length: u64, text: impl Into<String>) -> bool {
        self.comments.set(offset, length, text.into())
    }

    pub fn remove_comment(&mut self, offset: u64, length: u64) -> Option<String> {
        self.comments.remove(offset, length)
    }

    /// Colour a range; fails if it would partially overlap another highlight
    #[must_use = "returns whether the highlight was accepted"]
    pub fn set_highlight(&mut self, offset: u64, length: u64, colour: HighlightColour) -> bool {
        if length == 0 {
            return false;
        }
        self.highlights.set(offset, length, colour)
    }

    pub fn remove_highlight(&mut self, offset: u64, length: u64) -> Option<HighlightColour> {
        self.highlights.remove(offset, length)
    }

    fn check_range(&self, offset: u64, length: u64) -> Result<(), DocumentError> {
        let size = self.buffer_length();
        match offset.checked_add(length) {
            Some(end) if end <= size => Ok(()),
            _ => Err(DocumentError::OutOfRange {
                offset,
                length,
                size,
            }),
        }
    }
}

impl Document for MemoryDocument {
    fn buffer_length(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_data(&self, offset: u64, max_length: u64) -> Vec<u8> {
        let start = offset.min(self.buffer_length()) as usize;
        let end = offset.saturating_add(max_length).min(self.buffer_length()) as usize;
        self.data[start..end].to_vec()
    }

    fn overwrite_data(&mut self, offset: u64, data: &[u8]) -> Result<(), DocumentError> {
        self.check_range(offset, data.len() as u64)?;

        let start = offset as usize;
        let target = &mut self.data[start..start + data.len()];
        if target != data {
            target.copy_from_slice(data);
            self.modified = true;
        }

        Ok(())
    }

    fn insert_data(&mut self, offset: u64, data: &[u8]) -> Result<(), DocumentError> {
        self.check_range(offset, 0)?;
        if data.is_empty() {
            return Ok(());
        }

        let start = offset as usize;
        self.data.splice(start..start, data.iter().copied());
        self.highlights.data_inserted(offset, data.len() as u64);
        self.comments.data_inserted(offset, data.len() as u64);
        self.modified = true;

        Ok(())
    }

    fn erase_data(&mut self, offset: u64, length: u64) -> Result<(), DocumentError> {
        self.check_range(offset, length)?;
        if length == 0 {
            return Ok(());
        }

        let start = offset as usize;
        self.data.drain(start..start + length as usize);
        self.highlights.data_erased(offset, length);
        self.comments.data_erased(offset, length);
        self.modified = true;

        Ok(())
    }

    fn highlights(&self) -> &NestedOffsetLengthMap<HighlightColour> {
        &self.highlights
    }

    fn comments(&self) -> &NestedOffsetLengthMap<String> {
        &self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let data = vec![0x00, 0x01, 0x02, 0x03];
        let doc = MemoryDocument::new(data.clone());

        assert_eq!(doc.data(), &data);
        assert_eq!(doc.buffer_length(), 4);
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_read_data_clamps_at_end() {
        let doc = MemoryDocument::new(vec![0x00, 0x01, 0x02, 0x03]);

        assert_eq!(doc.read_data(1, 2), vec![0x01, 0x02]);
        assert_eq!(doc.read_data(2, 100), vec![0x02, 0x03]);
        assert!(doc.read_data(10, 4).is_empty());
    }

    #[test]
    fn test_overwrite_data() {
        let mut doc = MemoryDocument::new(vec![0x00, 0x01, 0x02, 0x03]);

        doc.overwrite_data(1, &[0xFF, 0xEE]).unwrap();
        assert_eq!(doc.data(), &[0x00, 0xFF, 0xEE, 0x03]);
        assert!(doc.is_modified());

        doc.mark_saved();
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_overwrite_same_bytes_keeps_unmodified() {
        let mut doc = MemoryDocument::new(vec![0x00, 0x01]);

        doc.overwrite_data(0, &[0x00]).unwrap();
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_overwrite_past_end_rejected() {
        let mut doc = MemoryDocument::new(vec![0x00, 0x01, 0x02]);

        let err = doc.overwrite_data(2, &[0xAA, 0xBB]).unwrap_err();
        assert_eq!(
            err,
            DocumentError::OutOfRange {
                offset: 2,
                length: 2,
                size: 3
            }
        );
        assert_eq!(doc.data(), &[0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_insert_data_at_end() {
        let mut doc = MemoryDocument::new(vec![0x00, 0x01, 0x02]);

        doc.insert_data(3, &[0xFF]).unwrap();
        assert_eq!(doc.data(), &[0x00, 0x01, 0x02, 0xFF]);

        assert!(doc.insert_data(5, &[0xFF]).is_err());
    }

    #[test]
    fn test_insert_on_empty_document() {
        let mut doc = MemoryDocument::new(vec![]);

        doc.insert_data(0, &[0xAA]).unwrap();
        assert_eq!(doc.data(), &[0xAA]);
    }

    #[test]
    fn test_erase_data() {
        let mut doc = MemoryDocument::new(vec![0x00, 0x01, 0x02, 0x03, 0x04]);

        doc.erase_data(1, 2).unwrap();
        assert_eq!(doc.data(), &[0x00, 0x03, 0x04]);
        assert!(doc.erase_data(2, 5).is_err());
    }

    #[test]
    fn test_insert_shifts_annotations() {
        let mut doc = MemoryDocument::new(vec![0; 16]);
        assert!(doc.set_comment(8, 4, "header"));
        assert!(doc.set_highlight(0, 4, HighlightColour(1)));

        doc.insert_data(2, &[0xAA, 0xBB]).unwrap();

        assert_eq!(doc.comments().get(10, 4), Some(&"header".to_string()));
        assert_eq!(doc.highlights().get(0, 6), Some(&HighlightColour(1)));
    }

    #[test]
    fn test_erase_removes_covered_comment() {
        let mut doc = MemoryDocument::new(vec![0; 16]);
        assert!(doc.set_comment(4, 2, "gone"));
        assert!(doc.set_comment(12, 2, "kept"));

        doc.erase_data(3, 4).unwrap();

        assert_eq!(doc.comments().len(), 1);
        assert_eq!(doc.comments().get(8, 2), Some(&"kept".to_string()));
    }

    #[test]
    fn test_zero_length_highlight_rejected() {
        let mut doc = MemoryDocument::new(vec![0; 4]);
        assert!(!doc.set_highlight(1, 0, HighlightColour(0)));
    }
}
