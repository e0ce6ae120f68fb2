//! Payment sources that transactions can be attributed to.

mod db;
mod domain;
mod endpoints;

pub use db::{create_source, create_source_table, delete_source, get_source, get_sources, update_source};
pub use domain::{Source, SourceId, SourceName};
pub use endpoints::{
    create_source_endpoint, delete_source_endpoint, get_source_endpoint, get_sources_endpoint,
    update_source_endpoint,
};
