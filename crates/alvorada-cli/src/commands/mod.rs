pub mod init;
pub mod list_models;
pub mod run;
pub mod stats;
pub mod validate;
