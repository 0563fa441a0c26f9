pub mod block;
pub mod error;
pub mod modifications;
pub mod page_config;
pub mod result;

pub use block::*;
pub use error::*;
pub use modifications::*;
pub use page_config::*;
pub use result::*;
