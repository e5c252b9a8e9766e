//! Raw resource data layouts.
//!
//! These types are a one-to-one mapping of the on-disk structures described in
//! <https://learn.microsoft.com/en-us/windows/win32/menurc/resource-file-formats> and
//! <https://learn.microsoft.com/en-us/windows/win32/menurc/version-information>.
//! All fields are stored little-endian regardless of the host.

use zerocopy::{
    byteorder::little_endian::{U16, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
};

use crate::constants::*;

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
    Default,
)]
pub struct IconDirectory {
    pub reserved: U16,
    pub type_:    U16,
    pub count:    U16,
}

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
    Default,
)]
pub struct IconDirectoryEntry {
    pub width:       u8,
    pub height:      u8,
    pub color_count: u8,
    pub reserved:    u8,
    pub planes:      U16,
    pub bit_count:   U16,
    pub bytes:       U32,
    pub id:          U16,
}

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct FixedFileInfo {
    pub signature:          U32,
    pub struct_version:     U32,
    pub file_version_ms:    U32,
    pub file_version_ls:    U32,
    pub product_version_ms: U32,
    pub product_version_ls: U32,
    pub file_flags_mask:    U32,
    pub file_flags:         U32,
    pub file_os:            U32,
    pub file_type:          U32,
    pub file_subtype:       U32,
    pub file_date_ms:       U32,
    pub file_date_ls:       U32,
}
impl Default for FixedFileInfo {
    fn default() -> Self {
        Self {
            signature:          U32::new(VS_FIXEDFILEINFO_SIGNATURE),
            struct_version:     U32::new(VS_FIXEDFILEINFO_VERSION),
            file_version_ms:    U32::new(0x00010000),
            file_version_ls:    U32::new(0),
            product_version_ms: U32::new(0x00010000),
            product_version_ls: U32::new(0),
            file_flags_mask:    U32::new(VS_FFI_FILEFLAGSMASK),
            file_flags:         U32::new(0),
            file_os:            U32::new(VOS_NT_WINDOWS32),
            file_type:          U32::new(VFT_APP),
            file_subtype:       U32::new(VFT2_UNKNOWN),
            file_date_ms:       U32::new(0),
            file_date_ls:       U32::new(0),
        }
    }
}

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
    Default,
)]
pub struct VersionHeader {
    pub length:       U16,
    pub value_length: U16,
    pub type_:        U16,
}

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
    Default,
)]
pub struct LanguageCodepage {
    pub language: U16,
    pub codepage: U16,
}
