//! Low-level UEFormat binary layer.
//!
//! ## File Structure
//!
//! ```text
//! +-----------------------+
//! | Magic: "UEFORMAT"     |  8 bytes
//! +-----------------------+
//! | Identifier            |  i32 length + UTF-8
//! | Version               |  1 byte
//! | Object name           |  i32 length + UTF-8
//! | Compressed flag       |  1 byte
//! +-----------------------+
//! | [Codec, sizes]        |  only when compressed
//! +-----------------------+
//! | Section*              |  name, count, byte size, body
//! +-----------------------+
//! ```
//!
//! All integers and floats are little-endian.

mod buffer;
mod format;
mod reader;
mod section;

pub use buffer::*;
pub use format::*;
pub use reader::*;
pub use section::*;
