//! Command implementations.

pub mod ask;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod list;

pub use self::ask::execute_ask;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::ingest::execute_ingest;
pub use self::list::execute_list;
