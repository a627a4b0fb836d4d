//! Byte document model consumed by the document view
//!
//! The view never owns bytes itself. It reads and edits through the
//! [`Document`] trait and reads annotations from the document's nested
//! comment and highlight maps.

pub mod buffer;
pub mod nested_map;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use buffer::MemoryDocument;
pub use nested_map::{NestedOffsetLengthMap, NestedRange};

/// Which column of the view the cursor is in
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CursorState {
    /// Keep whichever column the cursor is already in
    Goto,
    /// Hex column, on the high nibble
    #[default]
    Hex,
    /// Hex column, on the low nibble
    HexMid,
    /// ASCII column
    Ascii,
}

impl CursorState {
    /// Whether this state places the cursor in the hex column
    pub fn is_hex(self) -> bool {
        matches!(self, CursorState::Hex | CursorState::HexMid)
    }
}

/// Index into the palette's highlight colour slots
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct HighlightColour(pub usize);

/// Errors returned by document edits
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// The edit touches bytes beyond the end of the document
    OutOfRange { offset: u64, length: u64, size: u64 },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::OutOfRange {
                offset,
                length,
                size,
            } => write!(
                f,
                "range 0x{:X}+{} is outside of the {} byte document",
                offset, length, size
            ),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Byte storage and annotations backing a document view
pub trait Document {
    fn buffer_length(&self) -> u64;

    /// Read up to `max_length` bytes from `offset`; shorter at the end of the document
    fn read_data(&self, offset: u64, max_length: u64) -> Vec<u8>;

    fn overwrite_data(&mut self, offset: u64, data: &[u8]) -> Result<(), DocumentError>;

    fn insert_data(&mut self, offset: u64, data: &[u8]) -> Result<(), DocumentError>;

    fn erase_data(&mut self, offset: u64, length: u64) -> Result<(), DocumentError>;

    fn highlights(&self) -> &NestedOffsetLengthMap<HighlightColour>;

    fn comments(&self) -> &NestedOffsetLengthMap<String>;
}

/// Document handle shared between views and the host application
pub type SharedDocument = Rc<RefCell<dyn Document>>;
