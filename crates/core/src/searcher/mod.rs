//! Indexer result boundary.
//!
//! Raw records arrive here already fetched and parsed by the indexer-query
//! layer. This module derives their content identifiers, parses declared
//! dates, builds magnet links and removes duplicate torrents.

mod date;
mod dedup;
mod identifier;
mod types;

pub use date::parse_publish_date;
pub use dedup::deduplicate_first_seen;
pub use identifier::{build_magnet_uri, derive_info_hash, extract_btih, normalize_btih};
pub use types::*;
