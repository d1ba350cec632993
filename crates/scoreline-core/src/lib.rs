// Library root: read-only aggregation layer over a sports results store, plus
// the lazy catalog and navigation state a viewer drives.

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod lineups;
pub mod lookup;
pub mod match_view;
pub mod model;
pub mod navigation;
pub mod rounds;
pub mod session;
pub mod standings;
pub mod stats;
pub mod store;
pub mod timeline;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result, Section};
pub use store::{Database, QueryInterface, Row};
