//! Cross-DALF planning and emission-input assembly

pub mod dalf_path;
pub mod dedup;
pub mod emit;
pub mod error;
pub mod interfaces;
pub mod planner;

pub use emit::{JsonFiller, TemplateData, TemplateFiller};
pub use error::CodegenError;
pub use interfaces::InterfaceIndex;
pub use planner::Planner;
