pub mod loader;
pub mod viewer;
