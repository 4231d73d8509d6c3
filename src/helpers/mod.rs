//! Helper functions shared by the generators, server and CLI

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
