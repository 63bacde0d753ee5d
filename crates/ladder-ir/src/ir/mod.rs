mod display;
mod instruction;

pub use display::{render_listing, write_listing};
pub use instruction::{Instruction, SimNodeId};
