pub mod automation;
pub mod composer;
pub mod language;
pub mod send_pipeline;
pub mod sync;
pub mod variables;

pub use automation::*;
pub use send_pipeline::*;
pub use sync::*;
