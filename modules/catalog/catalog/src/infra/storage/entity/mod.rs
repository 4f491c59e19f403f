pub mod package;
pub mod package_tag;
pub mod tag;
