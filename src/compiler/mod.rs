pub mod context;
pub mod core;
pub mod data;
pub mod exceptions;
pub mod gateway;
pub mod linker;
pub mod loader;
pub mod loops;
pub mod mapper;
pub mod multi_instance;
pub mod resourcing;
