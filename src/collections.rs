//! Map type used by the matcher's position index
//!
//! The index maps every line of the longer input to its positions, so the
//! hasher sits on the hot path. gxhash is opt-in because it needs AES-NI/SSE2
//! at compile time; without it the std map is used as is.

#[cfg(feature = "gxhash")]
pub use gxhash::{HashMap, HashMapExt};

#[cfg(not(feature = "gxhash"))]
pub use std::collections::HashMap;
