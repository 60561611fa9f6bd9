//! Catalog presentation: product cards and note highlights.

mod card;
mod notes;

pub use card::{
    DEFAULT_CONCENTRATION, FALLBACK_NOTE_IMAGE, FALLBACK_PRODUCT_IMAGE, NotePreview,
    ProductCardView,
};
pub use notes::select_notes;
