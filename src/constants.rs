//! Windows API and binary constants.

#![allow(non_upper_case_globals)]

pub type DWORD = u32;
pub type WORD = u16;
pub type LANGID = WORD;


pub const VS_COMMENTS: &str = "Comments";
pub const VS_COMPANY_NAME: &str = "CompanyName";
pub const VS_FILE_DESCRIPTION: &str = "FileDescription";
pub const VS_FILE_VERSION: &str = "FileVersion";
pub const VS_INTERNAL_NAME: &str = "InternalName";
pub const VS_LEGAL_COPYRIGHT: &str = "LegalCopyright";
pub const VS_LEGAL_TRADEMARKS: &str = "LegalTrademarks";
pub const VS_ORIGINAL_FILENAME: &str = "OriginalFilename";
pub const VS_PRIVATE_BUILD: &str = "PrivateBuild";
pub const VS_PRODUCT_NAME: &str = "ProductName";
pub const VS_PRODUCT_VERSION: &str = "ProductVersion";
pub const VS_SPECIAL_BUILD: &str = "SpecialBuild";


// https://learn.microsoft.com/en-us/windows/win32/menurc/vs-versioninfo

pub const VS_VERSION_INFO_KEY: &str = "VS_VERSION_INFO";
pub const VS_STRING_FILE_INFO_KEY: &str = "StringFileInfo";
pub const VS_VAR_FILE_INFO_KEY: &str = "VarFileInfo";
pub const VS_TRANSLATION_KEY: &str = "Translation";

pub const VS_BINARY_VALUE: WORD = 0;
pub const VS_TEXT_VALUE: WORD = 1;

// every block starts on a 32-bit boundary
pub const VS_BLOCK_ALIGNMENT: usize = 4;


// https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-lcid/a9eac961-e77d-41a6-90a5-ce1a8b0cdb9c
pub const LANGUAGE_ID_NEUTRAL: LANGID = 0; // 0x0000, neutral
pub const LANGUAGE_ID_EN_US: LANGID = 1033; // 0x0409, en-US
// https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-ucoderef/28fefe92-d66c-4b03-90a9-97b473223d43
pub const CODE_PAGE_ID_EN_US: LANGID = 1200; // 0x04B0, UTF-16LE


// https://docs.microsoft.com/en-us/windows/win32/api/verrsrc/ns-verrsrc-vs_fixedfileinfo

pub const VS_FF_DEBUG: DWORD = 0x00000001;
pub const VS_FF_PRERELEASE: DWORD = 0x00000002;
pub const VS_FF_PATCHED: DWORD = 0x00000004;
pub const VS_FF_PRIVATEBUILD: DWORD = 0x00000008;
pub const VS_FF_INFOINFERRED: DWORD = 0x00000010;
pub const VS_FF_SPECIALBUILD: DWORD = 0x00000020;
pub const VS_FFI_FILEFLAGSMASK: DWORD = 0x0000003F;

pub const VOS_UNKNOWN: DWORD = 0x00000000;
pub const VOS_DOS: DWORD = 0x00010000;
pub const VOS_NT: DWORD = 0x00040000;
pub const VOS__WINDOWS16: DWORD = 0x00000001;
pub const VOS__WINDOWS32: DWORD = 0x00000004;
pub const VOS_OS216: DWORD = 0x00020000;
pub const VOS_OS232: DWORD = 0x00030000;
pub const VOS__PM16: DWORD = 0x00000002;
pub const VOS__PM32: DWORD = 0x00000003;
pub const VOS_DOS_WINDOWS16: DWORD = VOS_DOS | VOS__WINDOWS16;
pub const VOS_DOS_WINDOWS32: DWORD = VOS_DOS | VOS__WINDOWS32;
pub const VOS_NT_WINDOWS32: DWORD = VOS_NT | VOS__WINDOWS32;
pub const VOS_OS216_PM16: DWORD = VOS_OS216 | VOS__PM16;
pub const VOS_OS232_PM32: DWORD = VOS_OS232 | VOS__PM32;

pub const VFT_UNKNOWN: DWORD = 0x00000000;
pub const VFT_APP: DWORD = 0x00000001;
pub const VFT_DLL: DWORD = 0x00000002;
pub const VFT_DRV: DWORD = 0x00000003;
pub const VFT_FONT: DWORD = 0x00000004;
pub const VFT_STATIC_LIB: DWORD = 0x00000007;
pub const VFT_VXD: DWORD = 0x00000005;

pub const VFT2_UNKNOWN: DWORD = 0x00000000;
pub const VFT2_DRV_COMM: DWORD = 0x0000000A;
pub const VFT2_DRV_DISPLAY: DWORD = 0x00000004;
pub const VFT2_DRV_INSTALLABLE: DWORD = 0x00000008;
pub const VFT2_DRV_KEYBOARD: DWORD = 0x00000002;
pub const VFT2_DRV_LANGUAGE: DWORD = 0x00000003;
pub const VFT2_DRV_MOUSE: DWORD = 0x00000005;
pub const VFT2_DRV_NETWORK: DWORD = 0x00000006;
pub const VFT2_DRV_PRINTER: DWORD = 0x00000001;
pub const VFT2_DRV_SOUND: DWORD = 0x00000009;
pub const VFT2_DRV_SYSTEM: DWORD = 0x00000007;
pub const VFT2_DRV_VERSIONED_PRINTER: DWORD = 0x0000000C;
pub const VFT2_FONT_RASTER: DWORD = 0x00000001;
pub const VFT2_FONT_TRUETYPE: DWORD = 0x00000003;
pub const VFT2_FONT_VECTOR: DWORD = 0x00000002;

pub const VS_FIXEDFILEINFO_SIGNATURE: DWORD = 0xFEEF04BD;
pub const VS_FIXEDFILEINFO_VERSION: DWORD = 0x00010000;


// https://docs.microsoft.com/en-us/windows/win32/menurc/resource-types

pub const RT_CURSOR: WORD = 0x01;
pub const RT_ICON: WORD = 0x03;
pub const RT_GROUP_CURSOR: WORD = 0x0C;
pub const RT_GROUP_ICON: WORD = 0x0E;
pub const RT_VERSION: WORD = 0x10;


// https://learn.microsoft.com/en-us/windows/win32/menurc/newheader

pub const ICON_GROUP_RESERVED: WORD = 0;
pub const ICON_GROUP_TYPE_ICON: WORD = 1;
