pub mod arena;
pub mod input;
pub mod time;

pub use arena::{Arena, ArenaMark, ArenaSlice, ScratchAllocator};
pub use input::{InputState, Key, MouseBtn};
pub use time::{FramePacer, TitleTimer};
