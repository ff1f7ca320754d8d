pub mod apply;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod extract;
pub mod log;
pub mod operator;
pub mod prompt;
pub mod provider;
pub mod safety;
pub mod scene;
pub mod script;
pub mod ux;
pub mod wire;
