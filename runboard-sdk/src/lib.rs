pub mod client;
pub mod command;
pub mod document;
pub mod model;
pub mod rerun;
pub mod yaml;
