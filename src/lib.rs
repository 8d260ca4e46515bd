//! Extract structured per-patch JSON documents from DX7 SYSEX patch banks.
//!
//! The binary sysex format is never read here. The external `dx7dump` tool
//! renders each bank as plaintext, and this crate's [`parser`] turns each
//! rendered patch block into a [`Patch`] record. Splitting the tool's output
//! into blocks, slugging names and persisting documents live in [`bank`].

#![warn(missing_docs)]

pub mod bank;
pub mod parser;
pub mod patch;

pub use parser::parse_patch;
pub use patch::Patch;
