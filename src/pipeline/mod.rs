//! The capture → compute → edit → draw workflow.
//!
//! This module provides:
//! - The pipeline phase machine (`PipelinePhase`, `PipelineEvent`)
//! - A cancellable countdown before each snapshot
//! - Direct (image → art) and two-step (image → text → edit → art) runs
//! - Typed-text runs and fire-and-forget handwriting sample uploads

pub mod draw;
pub mod types;

mod countdown;
mod dependencies;
mod handle;
mod orchestrator;

pub use dependencies::PipelineDependencies;
pub use draw::{DrawTarget, draw_svg, prepare_polylines};
pub use handle::PipelineHandle;
pub use types::{PipelineConfig, PipelineError, PipelineEvent, PipelinePhase};
