pub mod cli;
pub mod config;
pub mod errors;
pub mod security;
pub mod surface;
pub mod uploader;
