pub mod assignment;
pub mod envelope;
pub mod error;
pub mod event;
pub mod file;
pub mod project;
pub mod resource;
pub mod submission;
pub mod user;
