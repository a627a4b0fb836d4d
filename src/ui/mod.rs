//! egui front end for the document control

pub mod document_view;
pub mod egui_canvas;

pub use document_view::{DocumentView, ViewOutput, ViewRequest};
