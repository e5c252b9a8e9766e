//! Decoder for **res**ource **info**rmation of portable executables.
//!
//! Supports:
//! * Parsing of icon group directories (`RT_GROUP_ICON`)
//! * Parsing of version information (`RT_VERSION`), including string lookup per language and codepage
//! * Building both back into raw resource data
//!
//! Locating resources in an image is left to the caller, the decoders operate on the raw resource bytes.
//! See [`IconGroup`] and [`VersionInfo`] for the main entry points.
//!
//! # Examples
//!
//! ### Icon group
//! ```
//! use resinfo::IconGroup;
//!
//! let group = IconGroup::parse(&data)?;
//! for entry in group.entries() {
//!     println!("{}x{} @ {} bpp: icon {}", entry.pixel_width(), entry.pixel_height(), entry.bit_count, entry.id);
//! }
//! ```
//!
//! ### Version information
//! ```
//! use resinfo::{constants::*, Translation, VersionInfo};
//!
//! let info = VersionInfo::parse(&data)?;
//! let query = info.query();
//!
//! // look up a string value in a specific language and codepage
//! let description = query.lookup(Translation::new(LANGUAGE_ID_EN_US, CODE_PAGE_ID_EN_US), VS_FILE_DESCRIPTION);
//!
//! // or in the first declared language that has it
//! let product = query.lookup_any(VS_PRODUCT_NAME);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, doc(cfg_hide(doc)))]

extern crate alloc;

pub(crate) mod cursor;
pub(crate) mod errors;
pub(crate) mod icon;
pub(crate) mod query;
pub(crate) mod util;
pub(crate) mod version;

pub mod constants;
pub mod types;

pub use crate::{cursor::ByteCursor, errors::*, icon::*, query::*, version::*};
