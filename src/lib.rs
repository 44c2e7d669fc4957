// This module is only used as an entry point for unit testing.
// Only the hardware-independent modules are compiled here.
#![cfg_attr(not(test), no_std)]

#[cfg(test)]
mod config;
#[cfg(test)]
mod convert;
#[cfg(test)]
mod debounce;
#[cfg(test)]
mod errors;
#[cfg(test)]
mod light_levels;
