//! Selection: the persistent identity set and its sync with the authority.

mod authority;
mod memory;
mod reconciler;
mod set;

pub use authority::*;
pub use memory::*;
pub use reconciler::*;
pub use set::*;
