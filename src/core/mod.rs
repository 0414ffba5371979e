//! Template lookup: library index, catalog and name resolution.
//!
//! - [`LibraryIndex`] - cached material names of a template library
//! - [`Catalog`] / [`CatalogStore`] - user-editable template catalog
//! - [`resolve`] - exact-then-normalized template lookup
//! - [`PackPaths`] - library and catalog locations inside a texture pack

mod catalog;
mod library;
mod pack;
mod resolver;

pub use catalog::*;
pub use library::*;
pub use pack::*;
pub use resolver::*;
