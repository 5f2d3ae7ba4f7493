//! Protocol source adapters.

mod yaml_file;

pub use yaml_file::YamlProtocolSource;
