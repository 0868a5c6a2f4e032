//! # UEFormat
//!
//! Rust decoder for the UEFormat binary interchange format used to move
//! meshes, skeletons, animations and world layouts out of Unreal Engine
//! content (`.uemodel`, `.ueanim`, `.ueworld`).
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types, geometry reshaping
//! - [`archive`] - Buffers, the bounded reader and section framing
//! - [`core`] - Header, compression stage, decode options, cancellation
//! - [`model`] - LODs, skeleton, collision (`UEMODEL`)
//! - [`anim`] - Tracks and curves (`UEANIM`)
//! - [`world`] - Hashed mesh library and actors (`UEWORLD`)
//! - [`uef`] - File-level entry points
//!
//! ## Example
//!
//! ```ignore
//! use ueformat::prelude::*;
//!
//! let file = open("SM_Chair.uemodel", &DecodeOptions::default())?;
//! let model = file.asset.as_model().expect("model payload");
//! let mesh = model.lod0().unwrap().to_render_mesh();
//! println!("{} triangles", mesh.triangle_count());
//! ```

pub mod util;
pub mod archive;
pub mod core;
pub mod model;
pub mod anim;
pub mod world;
pub mod uef;

// Re-export commonly used types
pub use crate::util::{Error, ErrorKind, Result};
pub use crate::core::{CancelToken, CodecRegistry, DecodeOptions, Header, PayloadKind};
pub use crate::uef::{decode, decode_all, open, Asset, UeFile};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3f, EngineToYUp, Error, ErrorKind, Result};
    pub use crate::archive::FormatVersion;
    pub use crate::core::{CancelToken, Codec, CodecRegistry, DecodeOptions, Header, PayloadKind};
    pub use crate::model::{LodMesh, Model, RenderMesh, Skeleton};
    pub use crate::anim::Animation;
    pub use crate::world::World;
    pub use crate::uef::{decode, decode_all, open, Asset, UeFile};
}
