pub mod error;
pub mod model;
pub mod packages;
pub mod repo;
pub mod tag_catalog;
pub mod tags;
pub mod validation;
