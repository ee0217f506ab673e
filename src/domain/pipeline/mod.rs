//! Short pipeline - script, narration and video for one prompt

mod short;

pub use short::{DEFAULT_MAX_CONCURRENT, Narration, ShortOutcome, ShortPipeline};
