pub mod send_record;
pub mod template;

pub use send_record::*;
pub use template::*;
