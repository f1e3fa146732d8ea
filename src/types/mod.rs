pub mod analytics;
pub mod result;
pub mod row;

pub use analytics::*;
pub use result::*;
pub use row::*;
