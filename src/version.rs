//! Version information resources.
//! A version resource is a tree of self-describing blocks rooted at a `VS_VERSIONINFO` block,
//! holding a fixed file info structure, a translation table and string tables per language and codepage.
//! See <https://learn.microsoft.com/en-us/windows/win32/menurc/version-information> for more information.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::{fmt, mem::size_of};

use ahash::RandomState;
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use log::{debug, error, trace, warn};
use zerocopy::{byteorder::little_endian::U32, IntoBytes};

use crate::{constants::*, cursor::*, errors::*, query::*, types::*, util::*};

/// Insertion-ordered string values of one language and codepage.
pub type StringTable = IndexMap<String, String, RandomState>;

/// Language and codepage pair identifying a string table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Translation {
    pub language: u16,
    pub codepage: u16,
}
impl Translation {
    pub const fn new(language: u16, codepage: u16) -> Self { Self { language, codepage } }

    /// Parse a string table name of exactly 8 hexadecimal digits, 4 for the language followed by 4 for the codepage.
    pub fn from_key<S: AsRef<str>>(key: S) -> Option<Self> {
        let key = key.as_ref();
        if key.len() != 8 || !key.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(key, 16).ok()?;
        Some(Self::new((value >> 16) as u16, value as u16))
    }

    /// Returns the string table name for the pair.
    pub fn key(&self) -> String { self.to_string() }
}
impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}{:04x}", self.language, self.codepage)
    }
}
impl From<LanguageCodepage> for Translation {
    fn from(pair: LanguageCodepage) -> Self { Self::new(pair.language.get(), pair.codepage.get()) }
}

/// Fixed file information of a version resource.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FixedVersionInfo {
    pub file_version_ms:    u32,
    pub file_version_ls:    u32,
    pub product_version_ms: u32,
    pub product_version_ls: u32,
    pub file_flags_mask:    u32,
    pub file_flags:         u32,
    pub file_os:            u32,
    pub file_type:          u32,
    pub file_subtype:       u32,
    pub file_date_ms:       u32,
    pub file_date_ls:       u32,
}
impl Default for FixedVersionInfo {
    fn default() -> Self { Self::from(FixedFileInfo::default()) }
}
impl FixedVersionInfo {
    fn parse(value: &[u8]) -> Result<Self, DecodeError> {
        if value.len() < size_of::<FixedFileInfo>() {
            return Err(DecodeError::InvalidHeader(format!(
                "fixed file info is {} bytes, expected at least {}",
                value.len(),
                size_of::<FixedFileInfo>()
            )));
        }
        let info = ByteCursor::new(value).read::<FixedFileInfo>()?;
        trace!("{:#x?}", info);
        if info.signature.get() != VS_FIXEDFILEINFO_SIGNATURE {
            return Err(DecodeError::InvalidHeader(format!(
                "fixed file info signature is {:#x}",
                info.signature.get()
            )));
        }
        Ok(Self::from(info))
    }

    /// Returns the file version as major, minor, patch and build.
    pub fn file_version(&self) -> [u16; 4] { split_version(self.file_version_ms, self.file_version_ls) }

    /// Returns the product version as major, minor, patch and build.
    pub fn product_version(&self) -> [u16; 4] {
        split_version(self.product_version_ms, self.product_version_ls)
    }

    /// Set the file version from major, minor, patch and build.
    pub fn set_file_version(&mut self, version: [u16; 4]) {
        (self.file_version_ms, self.file_version_ls) = join_version(version);
    }

    /// Set the product version from major, minor, patch and build.
    pub fn set_product_version(&mut self, version: [u16; 4]) {
        (self.product_version_ms, self.product_version_ls) = join_version(version);
    }

    /// Returns `true` if the given `VS_FF_*` flag is set and valid according to the flags mask.
    pub fn has_flag(&self, flag: u32) -> bool { self.file_flags & self.file_flags_mask & flag != 0 }

    /// Returns the file date as a 64-bit value.
    pub fn file_date(&self) -> u64 { (self.file_date_ms as u64) << 32 | self.file_date_ls as u64 }
}
impl From<FixedFileInfo> for FixedVersionInfo {
    fn from(info: FixedFileInfo) -> Self {
        Self {
            file_version_ms:    info.file_version_ms.get(),
            file_version_ls:    info.file_version_ls.get(),
            product_version_ms: info.product_version_ms.get(),
            product_version_ls: info.product_version_ls.get(),
            file_flags_mask:    info.file_flags_mask.get(),
            file_flags:         info.file_flags.get(),
            file_os:            info.file_os.get(),
            file_type:          info.file_type.get(),
            file_subtype:       info.file_subtype.get(),
            file_date_ms:       info.file_date_ms.get(),
            file_date_ls:       info.file_date_ls.get(),
        }
    }
}
impl From<&FixedVersionInfo> for FixedFileInfo {
    fn from(info: &FixedVersionInfo) -> Self {
        Self {
            signature:          U32::new(VS_FIXEDFILEINFO_SIGNATURE),
            struct_version:     U32::new(VS_FIXEDFILEINFO_VERSION),
            file_version_ms:    U32::new(info.file_version_ms),
            file_version_ls:    U32::new(info.file_version_ls),
            product_version_ms: U32::new(info.product_version_ms),
            product_version_ls: U32::new(info.product_version_ls),
            file_flags_mask:    U32::new(info.file_flags_mask),
            file_flags:         U32::new(info.file_flags),
            file_os:            U32::new(info.file_os),
            file_type:          U32::new(info.file_type),
            file_subtype:       U32::new(info.file_subtype),
            file_date_ms:       U32::new(info.file_date_ms),
            file_date_ls:       U32::new(info.file_date_ls),
        }
    }
}

fn split_version(ms: u32, ls: u32) -> [u16; 4] {
    [(ms >> 16) as u16, ms as u16, (ls >> 16) as u16, ls as u16]
}

fn join_version(version: [u16; 4]) -> (u32, u32) {
    (
        (version[0] as u32) << 16 | version[1] as u32,
        (version[2] as u32) << 16 | version[3] as u32,
    )
}

/// Top-level block of a version resource that is neither `StringFileInfo` nor `VarFileInfo`.
/// The raw bytes of the complete block are kept so it can be written back unchanged.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnknownBlock {
    key:  String,
    data: DebugIgnore<Vec<u8>>,
}
impl UnknownBlock {
    /// Returns the key of the block.
    pub fn key(&self) -> &str { &self.key }

    /// Returns the raw bytes of the block including its header.
    pub fn data(&self) -> &[u8] { &self.data }
}

/// One block of the version resource tree, bounded by its declared length.
struct Block<'a> {
    key:        String,
    value_type: u16,
    value:      &'a [u8],
    raw:        &'a [u8],
    children:   ByteCursor<'a>,
}
impl<'a> Block<'a> {
    fn parse(parent: &mut ByteCursor<'a>, level: usize) -> Result<Self, DecodeError> {
        let offset = parent.offset();
        let header = parent.peek::<VersionHeader>()?;
        trace!("{} {:#x?}: {:#x?}", "--".repeat(level + 1), offset, header);

        let length = header.length.get() as usize;
        if length < size_of::<VersionHeader>() {
            return Err(DecodeError::MalformedBlock(format!(
                "block at offset {:#x} declares length {}",
                offset, length
            )));
        }
        if length > parent.remaining() {
            return Err(DecodeError::MalformedBlock(format!(
                "block at offset {:#x} declares length {} with {} bytes remaining in its parent",
                offset,
                length,
                parent.remaining()
            )));
        }

        let mut block = parent.slice(length)?;
        let raw = block.clone().read_bytes(length)?;
        block.read::<VersionHeader>()?;
        let key = block.read_utf16_cstring()?;
        trace!("{} {:?}", "--".repeat(level + 1), key);

        let value_type = header.type_.get();
        let value_length = header.value_length.get() as usize;
        let value: &[u8] = if value_length == 0 {
            &[]
        } else if value_type == VS_TEXT_VALUE {
            // text values count 16-bit units and may omit the terminator
            skip_padding(&mut block)?;
            let length = (value_length * 2).min(block.remaining());
            block.read_bytes(length)?
        } else {
            skip_padding(&mut block)?;
            if value_length > block.remaining() {
                return Err(DecodeError::MalformedBlock(format!(
                    "value of block {:?} at offset {:#x} declares {} bytes with {} bytes remaining",
                    key,
                    offset,
                    value_length,
                    block.remaining()
                )));
            }
            block.read_bytes(value_length)?
        };

        Ok(Self {
            key,
            value_type,
            value,
            raw,
            children: block,
        })
    }

    fn next_child(&mut self, level: usize) -> Result<Option<Block<'a>>, DecodeError> {
        skip_padding(&mut self.children)?;
        if self.children.is_empty() {
            return Ok(None);
        }
        Block::parse(&mut self.children, level).map(Some)
    }
}

fn skip_padding(cursor: &mut ByteCursor) -> Result<(), DecodeError> {
    if !cursor.is_empty() {
        cursor.align(VS_BLOCK_ALIGNMENT)?;
    }
    Ok(())
}

fn text_value(value: &[u8]) -> String {
    let units = value
        .chunks_exact(2)
        .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
        .take_while(|&unit| unit != 0)
        .collect::<Vec<_>>();
    decode_utf16(&units)
}

/// Decoded version information resource.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct VersionInfo {
    pub(crate) fixed:        Option<FixedVersionInfo>,
    pub(crate) translations: Vec<Translation>,
    pub(crate) strings:      IndexMap<Translation, StringTable, RandomState>,
    pub(crate) unknown:      Vec<UnknownBlock>,
}
impl VersionInfo {
    /// Parse version information from the raw bytes of an `RT_VERSION` resource.
    ///
    /// # Returns
    /// Returns the decoded version information, or an error at the first structural violation.
    /// Missing fixed file info, translations or string tables are not errors.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(data);
        let mut root = Block::parse(&mut cursor, 0)?;
        if root.key != VS_VERSION_INFO_KEY {
            return Err(DecodeError::InvalidHeader(format!("root block key is {:?}", root.key)));
        }
        if root.value_type != VS_BINARY_VALUE {
            return Err(DecodeError::InvalidHeader(format!(
                "root block value type is {}",
                root.value_type
            )));
        }

        let mut info = Self {
            fixed: match root.value {
                [] => None,
                value => Some(FixedVersionInfo::parse(value)?),
            },
            ..Default::default()
        };

        while let Some(child) = root.next_child(1)? {
            match child.key.as_str() {
                VS_STRING_FILE_INFO_KEY => info.parse_string_file_info(child)?,
                VS_VAR_FILE_INFO_KEY => info.parse_var_file_info(child)?,
                _ => {
                    warn!("skipping unknown version block {:?}", child.key);
                    info.unknown.push(UnknownBlock {
                        key:  child.key,
                        data: child.raw.to_vec().into(),
                    });
                }
            }
        }

        debug!(
            "version info with fixed info: {}, translations: {:?}, string tables: {}, unknown blocks: {}",
            info.fixed.is_some(),
            info.translations,
            info.strings.len(),
            info.unknown.len()
        );
        Ok(info)
    }

    fn parse_var_file_info(&mut self, mut block: Block) -> Result<(), DecodeError> {
        while let Some(var) = block.next_child(2)? {
            if var.key != VS_TRANSLATION_KEY {
                warn!("skipping unknown var block {:?}", var.key);
                continue;
            }
            let mut pairs = ByteCursor::new(var.value);
            while pairs.remaining() >= size_of::<LanguageCodepage>() {
                self.translations.push(Translation::from(pairs.read::<LanguageCodepage>()?));
            }
            if !pairs.is_empty() {
                warn!("ignoring {} trailing bytes of translation table", pairs.remaining());
            }
        }
        Ok(())
    }

    fn parse_string_file_info(&mut self, mut block: Block) -> Result<(), DecodeError> {
        while let Some(mut table) = block.next_child(2)? {
            let translation = Translation::from_key(&table.key).ok_or_else(|| {
                DecodeError::MalformedBlock(format!(
                    "string table key {:?} is not a language and codepage",
                    table.key
                ))
            })?;
            let strings = self.strings.entry(translation).or_default();
            while let Some(entry) = table.next_child(3)? {
                if entry.value_type != VS_TEXT_VALUE {
                    warn!("skipping non-text string entry {:?} in table {}", entry.key, translation);
                    continue;
                }
                let value = text_value(entry.value);
                trace!("---- {}: {:?} = {:?}", translation, entry.key, value);
                strings.insert(entry.key, value);
            }
        }
        Ok(())
    }

    /// Build the version information into raw bytes of an `RT_VERSION` resource.
    ///
    /// # Returns
    /// Returns an error if a block exceeds the maximum block size of 65535 bytes.
    pub fn build(&self) -> Result<Vec<u8>, EncodeError> {
        let mut children = Vec::new();
        if !self.strings.is_empty() {
            let mut tables = Vec::with_capacity(self.strings.len());
            for (translation, strings) in &self.strings {
                let mut entries = Vec::with_capacity(strings.len());
                for (key, value) in strings {
                    let value = string_to_u16(check_nul(value)?);
                    entries.push(build_block(key, VS_TEXT_VALUE, value.len() / 2, &value, &[])?);
                }
                tables.push(build_block(&translation.key(), VS_TEXT_VALUE, 0, &[], &entries)?);
            }
            children.push(build_block(VS_STRING_FILE_INFO_KEY, VS_TEXT_VALUE, 0, &[], &tables)?);
        }
        if !self.translations.is_empty() {
            let mut pairs = Vec::with_capacity(self.translations.len() * 4);
            for translation in &self.translations {
                pairs.extend(translation.language.to_le_bytes());
                pairs.extend(translation.codepage.to_le_bytes());
            }
            let translation =
                build_block(VS_TRANSLATION_KEY, VS_BINARY_VALUE, pairs.len(), &pairs, &[])?;
            children.push(build_block(VS_VAR_FILE_INFO_KEY, VS_TEXT_VALUE, 0, &[], &[translation])?);
        }
        children.extend(self.unknown.iter().map(|block| block.data.to_vec()));

        let fixed = self.fixed.as_ref().map(FixedFileInfo::from);
        let value = fixed.as_ref().map(|fixed| fixed.as_bytes()).unwrap_or_default();
        build_block(VS_VERSION_INFO_KEY, VS_BINARY_VALUE, value.len(), value, &children)
    }

    /// Returns the fixed file info, if present.
    pub fn fixed(&self) -> Option<&FixedVersionInfo> { self.fixed.as_ref() }

    /// Set the fixed file info.
    pub fn set_fixed(&mut self, fixed: Option<FixedVersionInfo>) { self.fixed = fixed; }

    /// Returns the translation table in declaration order.
    pub fn translations(&self) -> &[Translation] { &self.translations }

    /// Returns the string tables in the order they were encountered.
    pub fn string_tables(&self) -> impl Iterator<Item = (&Translation, &StringTable)> {
        self.strings.iter()
    }

    /// Returns the string table for the given language and codepage.
    pub fn string_table(&self, translation: Translation) -> Option<&StringTable> {
        self.strings.get(&translation)
    }

    /// Returns the top-level blocks that were skipped while decoding.
    pub fn unknown_blocks(&self) -> &[UnknownBlock] { &self.unknown }

    /// Returns a read-only query view over the decoded data.
    pub fn query(&self) -> VersionQuery<'_> { VersionQuery::new(self) }

    /// Add or replace a string value.
    /// The translation is added to the translation table if it is not yet declared.
    ///
    /// # Returns
    /// The replaced value.
    pub fn set_string<K: Into<String>, V: Into<String>>(
        &mut self, translation: Translation, key: K, value: V,
    ) -> Option<String> {
        if !self.translations.contains(&translation) {
            self.translations.push(translation);
        }
        self.strings.entry(translation).or_default().insert(key.into(), value.into())
    }

    /// Remove a string value.
    /// If the table is left empty, the table and its translation are removed as well.
    ///
    /// # Returns
    /// The removed value.
    pub fn remove_string(&mut self, translation: Translation, key: &str) -> Option<String> {
        let table = self.strings.get_mut(&translation)?;
        let value = table.shift_remove(key);
        if table.is_empty() {
            self.remove_strings(translation);
        }
        value
    }

    /// Remove the string table and translation of the given language and codepage.
    ///
    /// # Returns
    /// The removed string table.
    pub fn remove_strings(&mut self, translation: Translation) -> Option<StringTable> {
        self.translations.retain(|&t| t != translation);
        self.strings.shift_remove(&translation)
    }
}

fn check_nul(string: &str) -> Result<&str, EncodeError> {
    if string.contains('\0') {
        error!("version string {:?} contains a nul character", string);
        return Err(EncodeError::InteriorNul(string.into()));
    }
    Ok(string)
}

fn build_block(
    key: &str, value_type: u16, value_length: usize, value: &[u8], children: &[Vec<u8>],
) -> Result<Vec<u8>, EncodeError> {
    let mut data = Vec::new();
    data.extend(VersionHeader::default().as_bytes());
    data.extend(string_to_u16(check_nul(key)?));
    if !value.is_empty() {
        pad_to(&mut data, VS_BLOCK_ALIGNMENT);
        data.extend(value);
    }
    for child in children {
        pad_to(&mut data, VS_BLOCK_ALIGNMENT);
        data.extend(child);
    }

    let length = u16::try_from(data.len()).map_err(|_| {
        error!("version block {:?} is {} bytes", key, data.len());
        EncodeError::BlockTooLarge(key.into(), data.len())
    })?;
    let value_length = u16::try_from(value_length)
        .map_err(|_| EncodeError::BlockTooLarge(key.into(), value_length))?;
    let header = VersionHeader {
        length:       length.into(),
        value_length: value_length.into(),
        type_:        value_type.into(),
    };
    data[..size_of::<VersionHeader>()].copy_from_slice(header.as_bytes());
    Ok(data)
}
