pub mod filter;
pub mod issue;
pub mod search;
pub mod status;

pub use filter::*;
pub use issue::*;
pub use search::*;
pub use status::*;
