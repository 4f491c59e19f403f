mod mapper;
mod server;

pub use server::PackageServiceImpl;
