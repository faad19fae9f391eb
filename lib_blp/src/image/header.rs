use log::{debug, error};

use super::format::{CompressionKind, HEADER_SIZE, MAGIC_HEADER, MAX_MIPS, VERSION};
use crate::error::{BlpError, DataError, FormatError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub compression: CompressionKind,
    pub alpha_depth: u8,
    pub format_hint: u8,
    pub mip_flag: u8,
    pub width: u32,
    pub height: u32,
    pub mip_offsets: [u32; MAX_MIPS],
    pub mip_sizes: [u32; MAX_MIPS],
}

impl ContainerHeader {
    const VERSION_OFFSET: usize = 0x04;
    const COMPRESSION_OFFSET: usize = 0x08;
    const ALPHA_DEPTH_OFFSET: usize = 0x09;
    const FORMAT_HINT_OFFSET: usize = 0x0A;
    const MIP_FLAG_OFFSET: usize = 0x0B;
    const WIDTH_OFFSET: usize = 0x0C;
    const HEIGHT_OFFSET: usize = 0x10;
    const MIP_OFFSETS_OFFSET: usize = 0x14;
    const MIP_SIZES_OFFSET: usize = 0x54;

    pub fn new(compression: CompressionKind, width: u32, height: u32) -> Self {
        Self {
            magic: MAGIC_HEADER,
            version: VERSION,
            compression,
            alpha_depth: 0,
            format_hint: 0,
            mip_flag: 0,
            width,
            height,
            mip_offsets: [0; MAX_MIPS],
            mip_sizes: [0; MAX_MIPS],
        }
    }

    /// Serializes the header into its fixed 148-byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.compression as u8);
        out.push(self.alpha_depth);
        out.push(self.format_hint);
        out.push(self.mip_flag);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        for offset in &self.mip_offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        for size in &self.mip_sizes {
            out.extend_from_slice(&size.to_le_bytes());
        }
        debug_assert_eq!(out.len(), HEADER_SIZE);
        out
    }
}

/// One populated slot of the mipmap chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipmapLevel<'a> {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub offset: usize,
    pub size: usize,
    pub data: &'a [u8],
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

pub fn parse_header(bytes: &[u8]) -> Result<ContainerHeader, BlpError> {
    if !bytes.starts_with(&MAGIC_HEADER) {
        let found = bytes[..bytes.len().min(MAGIC_HEADER.len())].to_vec();
        error!("Invalid magic tag {:?}", found);
        return Err(FormatError::BadMagic(found).into());
    }
    if bytes.len() < HEADER_SIZE {
        error!(
            "Header truncated: {} bytes available, {} required",
            bytes.len(),
            HEADER_SIZE
        );
        return Err(DataError::Truncated {
            what: "header",
            expected: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let version = read_u32(bytes, ContainerHeader::VERSION_OFFSET);
    if version != VERSION {
        error!("Unsupported version {}", version);
        return Err(FormatError::UnsupportedVersion(version).into());
    }
    let compression = CompressionKind::try_from(bytes[ContainerHeader::COMPRESSION_OFFSET])?;

    let mut mip_offsets = [0u32; MAX_MIPS];
    let mut mip_sizes = [0u32; MAX_MIPS];
    for slot in 0..MAX_MIPS {
        mip_offsets[slot] = read_u32(bytes, ContainerHeader::MIP_OFFSETS_OFFSET + slot * 4);
        mip_sizes[slot] = read_u32(bytes, ContainerHeader::MIP_SIZES_OFFSET + slot * 4);
    }

    let header = ContainerHeader {
        magic: MAGIC_HEADER,
        version,
        compression,
        alpha_depth: bytes[ContainerHeader::ALPHA_DEPTH_OFFSET],
        format_hint: bytes[ContainerHeader::FORMAT_HINT_OFFSET],
        mip_flag: bytes[ContainerHeader::MIP_FLAG_OFFSET],
        width: read_u32(bytes, ContainerHeader::WIDTH_OFFSET),
        height: read_u32(bytes, ContainerHeader::HEIGHT_OFFSET),
        mip_offsets,
        mip_sizes,
    };
    debug!(
        "Header parsed: kind={:?} alpha_depth={} format_hint={} mip_flag={} size={}x{}",
        header.compression,
        header.alpha_depth,
        header.format_hint,
        header.mip_flag,
        header.width,
        header.height
    );
    Ok(header)
}

/// Walks all 16 slots and returns the populated ones in slot order.
///
/// Level dimensions are derived from the header size by halving, never read
/// from the payload.
pub fn walk_chain<'a>(
    bytes: &'a [u8],
    header: &ContainerHeader,
) -> Result<Vec<MipmapLevel<'a>>, FormatError> {
    let mut levels = Vec::new();
    for index in 0..MAX_MIPS {
        let offset = header.mip_offsets[index] as usize;
        let size = header.mip_sizes[index] as usize;
        if offset == 0 || size == 0 {
            continue;
        }
        let end = match offset.checked_add(size) {
            Some(end) if end <= bytes.len() => end,
            _ => {
                error!(
                    "Slot {} out of bounds: offset={} size={} buffer={}",
                    index,
                    offset,
                    size,
                    bytes.len()
                );
                return Err(FormatError::ChainOutOfBounds(index));
            }
        };
        let level = MipmapLevel {
            index,
            width: (header.width >> index).max(1),
            height: (header.height >> index).max(1),
            offset,
            size,
            data: &bytes[offset..end],
        };
        debug!(
            "Slot {}: {}x{} at offset {} ({} bytes)",
            index, level.width, level.height, offset, size
        );
        levels.push(level);
    }
    Ok(levels)
}
