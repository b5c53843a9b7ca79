#![cfg_attr(not(test), no_std)]

//! Board-agnostic boot logic: credentials, connect retry, address formatting
//! and the status screen model.

pub mod address;
pub mod bootstrap;
pub mod config;
pub mod connect;
pub mod link;
pub mod screen;
