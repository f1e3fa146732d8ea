pub mod float_control;
pub mod floaty;
pub mod helpers;
pub mod main;
pub mod vesc_tool;

pub use float_control::*;
pub use floaty::*;
pub use helpers::*;
pub use main::*;
pub use vesc_tool::*;
