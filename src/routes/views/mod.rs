mod pages;
mod router;
mod session;

pub use router::router;
