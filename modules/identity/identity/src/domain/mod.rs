pub mod error;
pub mod model;
pub mod passwords;
pub mod repo;
pub mod service;
pub mod tokens;
pub mod validation;
