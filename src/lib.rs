#![doc = include_str!("../README.md")]

mod error;
pub mod generate;
mod node;
mod oracle;
mod runner;

pub use error::Error;
pub use node::{NodeKind, Token};
pub use oracle::{normalize, wrap_inline, Oracle, Verdict};
pub use runner::Runner;
