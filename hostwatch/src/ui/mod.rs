//! UI module root: exposes drawing functions for individual panels.

pub mod cpu;
pub mod disk;
pub mod header;
pub mod mem;
pub mod system;
pub mod util;
