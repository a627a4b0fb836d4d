//! Builds the region list for a document from its comments

use serde::{Deserialize, Serialize};

use super::comment_region::CommentRegion;
use super::data_region::DataRegionDocHighlight;
use super::region::Region;
use crate::document::Document;

/// How comments are shown between the data
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum InlineCommentMode {
    Hidden,
    /// First line of each comment only
    Short,
    #[default]
    Full,
    /// First line only, commented bytes indented beneath
    ShortIndent,
    /// Full text, commented bytes indented beneath
    FullIndent,
}

impl InlineCommentMode {
    fn nests(self) -> bool {
        matches!(self, InlineCommentMode::ShortIndent | InlineCommentMode::FullIndent)
    }

    fn truncates(self) -> bool {
        matches!(self, InlineCommentMode::Short | InlineCommentMode::ShortIndent)
    }
}

fn push_data(regions: &mut Vec<Box<dyn Region>>, from: u64, to: u64) {
    if to > from {
        regions.push(Box::new(DataRegionDocHighlight::new(from, to - from)));
    }
}

/// Interleave comment regions with highlighted data regions
///
/// Data is split wherever a comment starts and, when nesting, wherever a
/// nested comment's range ends. The result always contains at least one data
/// region and never ends with a comment.
pub fn compute_regions(doc: &dyn Document, mode: InlineCommentMode) -> Vec<Box<dyn Region>> {
    let length = doc.buffer_length();
    let mut regions: Vec<Box<dyn Region>> = Vec::new();
    let mut offset = 0u64;
    let mut nest_ends: Vec<u64> = Vec::new();
    let mut ends_with_comment = false;

    if mode != InlineCommentMode::Hidden {
        for (range, text) in doc.comments().iter() {
            let start = range.offset.min(length);

            while let Some(&end) = nest_ends.last() {
                if end > start {
                    break;
                }
                push_data(&mut regions, offset, end);
                offset = offset.max(end);
                nest_ends.pop();
            }

            push_data(&mut regions, offset, start);
            offset = offset.max(start);

            regions.push(Box::new(CommentRegion::new(
                range.offset,
                range.length,
                text.as_str(),
                mode.nests(),
                mode.truncates(),
            )));
            ends_with_comment = true;

            if mode.nests() && range.length > 0 {
                nest_ends.push(range.end().min(length));
            }
        }
    }

    while let Some(end) = nest_ends.pop() {
        if end > offset {
            ends_with_comment = false;
        }
        push_data(&mut regions, offset, end);
        offset = offset.max(end);
    }

    if length > offset {
        ends_with_comment = false;
    }
    push_data(&mut regions, offset, length);

    if regions.is_empty() || ends_with_comment {
        regions.push(Box::new(DataRegionDocHighlight::new(length, 0)));
    }

    log::debug!("Built {} regions for {} byte document", regions.len(), length);

    regions
}
