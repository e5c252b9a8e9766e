//! Icon group directory resources.
//! An icon group lists the individual `RT_ICON` resources that make up one icon.
//! See <https://learn.microsoft.com/en-us/windows/win32/menurc/newheader> for more information.

use alloc::{format, vec::Vec};
use core::mem::size_of;

use log::{debug, trace};
use zerocopy::{
    byteorder::little_endian::{U16, U32},
    IntoBytes,
};

use crate::{constants::*, cursor::*, errors::*, types::*};

/// One icon variant in an icon group.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct IconGroupEntry {
    /// Width in pixels, 0 means 256.
    pub width:       u8,
    /// Height in pixels, 0 means 256.
    pub height:      u8,
    pub color_count: u8,
    pub planes:      u16,
    pub bit_count:   u16,
    /// Size of the icon image data in bytes.
    pub bytes:       u32,
    /// Resource id of the `RT_ICON` resource holding the image data.
    pub id:          u16,
}
impl IconGroupEntry {
    /// Returns the width in pixels.
    pub fn pixel_width(&self) -> u32 { if self.width == 0 { 256 } else { self.width as u32 } }

    /// Returns the height in pixels.
    pub fn pixel_height(&self) -> u32 { if self.height == 0 { 256 } else { self.height as u32 } }
}
impl From<IconDirectoryEntry> for IconGroupEntry {
    fn from(entry: IconDirectoryEntry) -> Self {
        Self {
            width:       entry.width,
            height:      entry.height,
            color_count: entry.color_count,
            planes:      entry.planes.get(),
            bit_count:   entry.bit_count.get(),
            bytes:       entry.bytes.get(),
            id:          entry.id.get(),
        }
    }
}
impl From<&IconGroupEntry> for IconDirectoryEntry {
    fn from(entry: &IconGroupEntry) -> Self {
        Self {
            width:       entry.width,
            height:      entry.height,
            color_count: entry.color_count,
            reserved:    0,
            planes:      U16::new(entry.planes),
            bit_count:   U16::new(entry.bit_count),
            bytes:       U32::new(entry.bytes),
            id:          U16::new(entry.id),
        }
    }
}

/// Decoded `RT_GROUP_ICON` resource.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IconGroup {
    pub(crate) reserved:      u16,
    pub(crate) resource_type: u16,
    pub(crate) entries:       Vec<IconGroupEntry>,
}
impl Default for IconGroup {
    fn default() -> Self {
        Self {
            reserved:      ICON_GROUP_RESERVED,
            resource_type: ICON_GROUP_TYPE_ICON,
            entries:       Vec::new(),
        }
    }
}
impl IconGroup {
    /// Parse an icon group from the raw bytes of an `RT_GROUP_ICON` resource.
    ///
    /// # Returns
    /// Returns the complete group, or an error at the first structural violation.
    /// No partial group is ever returned.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(data);

        let header = cursor.read::<IconDirectory>()?;
        trace!("{:#x?}", header);
        let reserved = header.reserved.get();
        if reserved != ICON_GROUP_RESERVED {
            return Err(DecodeError::InvalidHeader(format!(
                "icon group reserved field is {:#x}",
                reserved
            )));
        }
        let resource_type = header.type_.get();
        if resource_type != ICON_GROUP_TYPE_ICON {
            return Err(DecodeError::InvalidHeader(format!(
                "icon group type is {:#x}",
                resource_type
            )));
        }

        let count = header.count.get() as usize;
        let available = cursor.remaining() / size_of::<IconDirectoryEntry>();
        if count > available {
            return Err(DecodeError::OutOfBounds(format!(
                "icon group declares {} entries but only {} fit",
                count, available
            )));
        }

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let entry = cursor.read::<IconDirectoryEntry>()?;
            trace!("-- {} {:#x?}", index, entry);
            if entry.bytes.get() == 0 {
                return Err(DecodeError::MalformedBlock(format!(
                    "icon group entry {} has no data",
                    index
                )));
            }
            entries.push(IconGroupEntry::from(entry));
        }
        debug!("icon group with {} entries", entries.len());

        Ok(Self {
            reserved,
            resource_type,
            entries,
        })
    }

    /// Build the icon group into raw bytes of an `RT_GROUP_ICON` resource.
    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(
            size_of::<IconDirectory>() + self.entries.len() * size_of::<IconDirectoryEntry>(),
        );
        let header = IconDirectory {
            reserved: U16::new(self.reserved),
            type_:    U16::new(self.resource_type),
            count:    U16::new(self.entries.len() as u16),
        };
        data.extend(header.as_bytes());
        for entry in &self.entries {
            data.extend(IconDirectoryEntry::from(entry).as_bytes());
        }
        data
    }

    /// Returns the reserved header field, which is always 0.
    pub fn reserved(&self) -> u16 { self.reserved }

    /// Returns the resource type header field, which is always 1 for icons.
    pub fn resource_type(&self) -> u16 { self.resource_type }

    /// Returns the entries in directory order.
    pub fn entries(&self) -> &[IconGroupEntry] { &self.entries }

    /// Returns the number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if the group has no entries.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns the entry referencing the `RT_ICON` resource with the given id.
    pub fn get(&self, id: u16) -> Option<&IconGroupEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns the largest entry, preferring higher color depth for equal sizes.
    pub fn largest(&self) -> Option<&IconGroupEntry> {
        self.entries
            .iter()
            .max_by_key(|entry| (entry.pixel_width() * entry.pixel_height(), entry.bit_count))
    }

    /// Append an entry.
    /// Entries without image data are rejected.
    ///
    /// # Returns
    /// Returns an error if the entry has no data or the group already holds the maximum number of entries.
    pub fn push(&mut self, entry: IconGroupEntry) -> Result<(), EncodeError> {
        if entry.bytes == 0 {
            return Err(EncodeError::EmptyIconEntry(entry.id));
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(EncodeError::IconGroupFull(self.entries.len()));
        }
        self.entries.push(entry);
        Ok(())
    }
}
