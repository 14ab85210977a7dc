pub mod pool;

pub use pool::try_create_pool;
