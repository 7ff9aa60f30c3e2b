//! Courtboard Render Library
//!
//! Projects a board into a flat overlay of tokens, segments and labels,
//! and paints it. The default painter uses Vello.

pub mod overlay;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use overlay::{
    LineHandles, LineLabel, Overlay, OverlayOptions, Segment, TextRun, Token, TokenShape, build_overlay,
};
pub use renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
