//! Executable format readers supplying image layouts.

pub mod pe;
