pub mod archive;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod store;
