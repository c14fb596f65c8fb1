pub mod http;
pub mod repository;
pub mod runner;
pub mod service;
pub mod settings;
