pub mod provider_fake;
pub mod test_db;

#[allow(unused_imports)]
pub use provider_fake::*;
#[allow(unused_imports)]
pub use test_db::*;
