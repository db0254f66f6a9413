pub mod admin;
pub mod system;

pub use admin::*;
pub use system::*;
