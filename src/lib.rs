//! codetint - syntax coloring for code in rich-text documents and slides
//!
//! Finds fenced code blocks, existing code boxes and inline code spans in a
//! host document, boxes and de-fences the blocks and colors everything by
//! token. The host is reached only through the traits in [`host`];
//! [`memdoc`] provides an in-memory implementation.

pub mod colorize;
pub mod config;
pub mod delimiter;
pub mod engine;
pub mod error;
pub mod host;
pub mod memdoc;
pub mod normalize;
pub mod region;
pub mod registry;
pub mod render;
pub mod scanner;
pub mod style;
pub mod theme;
pub mod tokenize;

pub use config::Config;
pub use engine::{Engine, ModeActions, RunReport, Settings};
pub use error::{Error, Result};
pub use registry::StyleRegistry;
pub use theme::Theme;
