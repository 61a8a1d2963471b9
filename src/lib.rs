pub mod analyzers;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod session;
pub mod summary;
