mod config;
mod error;
mod id;
mod local;
mod memory;
mod traits;


pub use config::RepositoryConfig;
pub use error::{RepositoryError, Result};
pub use local::LocalRepository;
pub use memory::MemoryRepository;
pub use traits::Repository;
