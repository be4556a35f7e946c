//! Document model types.
//!
//! Everything here is derived per conversion run from the two input texts
//! (the LaTeX source and the transducer's draft) and discarded afterwards.

mod caption;
mod comment;
mod document;
mod heading;
mod table;

pub use caption::{LabelCaptionEntry, LabelCaptionMap};
pub use comment::{escape_html_comment, CommentBlock};
pub use document::Document;
pub use heading::{HeadingNode, MAX_HEADING_DEPTH};
pub(crate) use table::normalize_bold_artifact;
pub use table::{Row, TabularBlock};
