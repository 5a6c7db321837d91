pub mod garch;
pub mod nelder_mead;
pub mod returns;
