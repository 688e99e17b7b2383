//! Settings for scanning, the item cache and cover thumbnails, read from a
//! TOML file and `MARQUEE__*` environment variables.

mod load;
mod schema;

pub use load::{InvalidSettings, default_cache_dir, default_config_path, resolve_config_path};
pub use schema::*;
