#![cfg_attr(not(test), no_std)]

//! Board glue for the LS027B7DH01 status panel.

pub mod platform;
pub mod render;
