//! Material syncing against template libraries.
//!
//! ## Key Concepts
//!
//! - **Host**: the application owning materials, driven through [`AssetHost`]
//! - **Template**: a library material whose node graph replaces a source
//!   material's graph, keeping the source's textures
//! - **Remap**: pointing every user of the source at the template
//!
//! ## Example
//!
//! ```ignore
//! use matsync::core::{LibraryIndex, PackPaths};
//! use matsync::material::{sync_default_materials, DefaultSyncOptions, SceneDocument};
//!
//! let mut doc = SceneDocument::open("scene.json".as_ref())?;
//! let mut index = LibraryIndex::new();
//! let report = sync_default_materials(
//!     &mut doc,
//!     &mut index,
//!     &PackPaths::new("packs/vanilla"),
//!     &DefaultSyncOptions::default(),
//! )?;
//! println!("{}", report.summary());
//! ```

mod batch;
mod document;
mod graph;
mod host;
mod ops;
mod passes;
mod sync;

pub use batch::*;
pub use document::*;
pub use graph::*;
pub use host::*;
pub use ops::*;
pub use passes::*;
pub use sync::*;
