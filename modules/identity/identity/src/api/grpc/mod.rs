mod server;

pub use server::UserServiceImpl;
