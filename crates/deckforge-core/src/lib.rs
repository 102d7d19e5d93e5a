//! Core library for building PowerPoint decks from declarative slide descriptions.
//!
//! - Model: presentations, slides and shapes positioned in EMU
//! - Templates: consulting-style slides (agenda, matrix, timeline, KPI cards, ...) laid out
//!   on a grid with gaps so shapes never touch
//! - Decks: YAML/JSON descriptions rendered with `render_deck`
//! - PPTX: `write_pptx`/`save` emit a package, `open`/`read_pptx` parse one back
//! - Analysis: per-slide shape inventory and pairwise bounding-box overlaps
//!
//! Quick example:
//! ```no_run
//! use deckforge_core::prelude::*;
//! # fn main() -> deckforge_core::Result<()> {
//! let mut slide = SlideBuilder::new();
//! slide
//!     .rect(Rect::from_inches(1.0, 1.0, 3.0, 1.5))
//!     .set_fill(Fill::solid(Color::rgb(0, 63, 92)))
//!     .set_text(TextFrame::single(Paragraph::new("Phase 1").bold()));
//! let pres = PresentationBuilder::new(12_192_000, 6_858_000)
//!     .title("Roadmap")
//!     .push(slide.build())
//!     .build();
//! assert!(find_overlaps(&pres.slides[0].rects()).is_empty());
//! save(&pres, "roadmap.pptx")?;
//! # Ok(()) }
//! ```

pub mod analysis;
pub mod builder;
pub mod config;
pub mod deck;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod overlap;
pub mod pptx;
pub mod samples;
pub mod slides;
pub mod theme;
pub mod units;

pub use analysis::{DeckReport, ItemReport, SlideReport, analyze};
pub use builder::{PresentationBuilder, SlideBuilder};
pub use config::*;
pub use deck::{DeckSettings, DeckSpec, SlideSpec, render_deck};
pub use error::*;
pub use export::*;
pub use model::*;
pub use overlap::{Overlap, deck_overlaps, find_overlaps, slide_overlaps};
pub use pptx::{open, read_pptx, save, write_pptx};
pub use theme::{Palette, ThemeName};

/// Convenience prelude for common types and functions.
/// Importing `deckforge_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::analysis::{DeckReport, analyze};
    pub use crate::builder::{PresentationBuilder, SlideBuilder};
    pub use crate::config::{BuildConfig, BuildConfigBuilder, OverlapPolicy, SlideSize};
    pub use crate::deck::{DeckSpec, SlideSpec, render_deck};
    pub use crate::model::{
        Align, Anchor, Chart, ChartKind, Color, Fill, Font, Line, Paragraph, Presentation, Preset,
        Rect, Series, Shape, ShapeKind, Slide, Table, TextFrame,
    };
    pub use crate::overlap::find_overlaps;
    pub use crate::pptx::{open, save};
    pub use crate::theme::{Palette, ThemeName};
    pub use crate::units::{inches, points};
}
