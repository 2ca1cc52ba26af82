//! Program Image Loader.
//!
//! This module reads the textual program image format and places it in RAM. It performs:
//! 1. **Parsing:** `@<hex address>` starts a block; the whitespace-separated hex
//!    bytes that follow are loaded contiguously from that address.
//! 2. **Block termination:** the first token that is not a hex number ends the
//!    block; everything up to the next `@` is skipped.
//! 3. **Placement:** blocks are copied into [`Ram`], which grows to fit them.

use std::fs;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::core::units::memory::ram::Ram;

/// Errors produced while reading a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image could not be read.
    #[error("could not read program image: {0}")]
    Io(#[from] std::io::Error),
    /// An `@` record whose address is not a 32-bit hex number.
    #[error("invalid block address '@{0}'")]
    InvalidAddress(String),
    /// A hex value inside a block that does not fit in a byte.
    #[error("invalid byte '{0}' in program image")]
    InvalidByte(String),
}

/// One contiguous block of the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Address of the first byte.
    pub base: u32,
    /// Block contents.
    pub bytes: Vec<u8>,
}

/// A parsed program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    /// Blocks in file order; later blocks overwrite earlier ones.
    pub segments: Vec<Segment>,
}

impl ProgramImage {
    /// Parses the textual image format.
    ///
    /// ```
    /// use tomasulo_core::sim::loader::ProgramImage;
    ///
    /// let image = ProgramImage::parse("@00000004\n13 05 F0 0F\n").unwrap();
    /// assert_eq!(image.segments[0].base, 4);
    /// assert_eq!(image.segments[0].bytes, vec![0x13, 0x05, 0xF0, 0x0F]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidAddress`] or [`LoadError::InvalidByte`].
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut in_block = false;

        let mut tokens = text.split_whitespace();
        while let Some(token) = tokens.next() {
            if let Some(addr) = token.strip_prefix('@') {
                // `@ 1000` names the address in the following token.
                let addr = if addr.is_empty() {
                    tokens.next().unwrap_or_default()
                } else {
                    addr
                };
                let base = u32::from_str_radix(addr, 16)
                    .map_err(|_| LoadError::InvalidAddress(addr.to_string()))?;
                segments.push(Segment {
                    base,
                    bytes: Vec::new(),
                });
                in_block = true;
                continue;
            }
            if !in_block {
                continue;
            }
            let Ok(value) = u32::from_str_radix(token, 16) else {
                in_block = false;
                continue;
            };
            let byte = u8::try_from(value).map_err(|_| LoadError::InvalidByte(token.to_string()))?;
            if let Some(seg) = segments.last_mut() {
                seg.bytes.push(byte);
            }
        }

        Ok(Self { segments })
    }

    /// Reads and parses an image from any reader (e.g. stdin).
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if reading fails, or any parse error.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut text = String::new();
        let _ = reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Reads and parses an image file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file cannot be read, or any parse error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Total number of image bytes.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.bytes.len()).sum()
    }

    /// Whether the image holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every block into `ram`, growing it as needed.
    pub fn load_into(&self, ram: &mut Ram) {
        for seg in &self.segments {
            ram.load(seg.base, &seg.bytes);
        }
    }

    /// Builds a RAM of at least `size` bytes holding this image.
    pub fn to_ram(&self, size: usize) -> Ram {
        let mut ram = Ram::new(size);
        self.load_into(&mut ram);
        ram
    }
}
