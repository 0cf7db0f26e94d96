//! Byte compressors used as the black-box cost model for compression deltas.
//!
//! Every backend is configured once at construction and reused for all calls,
//! so sizes reported by one instance are comparable with each other. Sizes
//! from different backends or settings are not.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{PenprintError, Result};

pub trait Compressor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Length in bytes of the compressed form of `data`.
    fn compressed_size(&self, data: &[u8]) -> Result<usize>;

    fn describe(&self) -> String {
        self.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrotliCompressor {
    quality: u32,
    window_bits: u32,
}

impl BrotliCompressor {
    pub const DEFAULT_QUALITY: u32 = 11;
    pub const DEFAULT_WINDOW_BITS: u32 = 22;

    pub fn new(quality: u32, window_bits: u32) -> Result<Self> {
        if quality > 11 {
            return Err(PenprintError::InvalidOptions(format!(
                "brotli quality must be in 0..=11, got {quality}"
            )));
        }
        if !(10..=24).contains(&window_bits) {
            return Err(PenprintError::InvalidOptions(format!(
                "brotli window must be in 10..=24 bits, got {window_bits}"
            )));
        }
        Ok(Self {
            quality,
            window_bits,
        })
    }
}

impl Default for BrotliCompressor {
    fn default() -> Self {
        Self {
            quality: Self::DEFAULT_QUALITY,
            window_bits: Self::DEFAULT_WINDOW_BITS,
        }
    }
}

impl Compressor for BrotliCompressor {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut params = brotli::enc::BrotliEncoderParams::default();
        params.quality = self.quality as i32;
        params.lgwin = self.window_bits as i32;

        let mut input = data;
        let mut out = Vec::with_capacity(data.len() / 2 + 16);
        brotli::BrotliCompress(&mut input, &mut out, &params).map_err(|source| {
            PenprintError::Compressor {
                codec: self.name(),
                source,
            }
        })?;
        Ok(out.len())
    }

    fn describe(&self) -> String {
        format!(
            "brotli(quality={}, window={})",
            self.quality, self.window_bits
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub const DEFAULT_LEVEL: i32 = 19;

    pub fn new(level: i32) -> Result<Self> {
        if !(1..=22).contains(&level) {
            return Err(PenprintError::InvalidOptions(format!(
                "zstd level must be in 1..=22, got {level}"
            )));
        }
        Ok(Self { level })
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        zstd::stream::encode_all(data, self.level)
            .map(|compressed| compressed.len())
            .map_err(|source| PenprintError::Compressor {
                codec: self.name(),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("zstd(level={})", self.level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateCompressor {
    level: u32,
}

impl DeflateCompressor {
    pub const DEFAULT_LEVEL: u32 = 9;

    pub fn new(level: u32) -> Result<Self> {
        if level > 9 {
            return Err(PenprintError::InvalidOptions(format!(
                "deflate level must be in 0..=9, got {level}"
            )));
        }
        Ok(Self { level })
    }
}

impl Compressor for DeflateCompressor {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let wrap = |source| PenprintError::Compressor {
            codec: "deflate",
            source,
        };

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data).map_err(wrap)?;
        encoder.finish().map(|compressed| compressed.len()).map_err(wrap)
    }

    fn describe(&self) -> String {
        format!("deflate(level={})", self.level)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum CompressorSettings {
    Brotli {
        #[serde(default = "default_brotli_quality")]
        quality: u32,
        #[serde(default = "default_brotli_window")]
        window_bits: u32,
    },
    Zstd {
        #[serde(default = "default_zstd_level")]
        level: i32,
    },
    Deflate {
        #[serde(default = "default_deflate_level")]
        level: u32,
    },
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::Brotli {
            quality: BrotliCompressor::DEFAULT_QUALITY,
            window_bits: BrotliCompressor::DEFAULT_WINDOW_BITS,
        }
    }
}

fn default_brotli_quality() -> u32 {
    BrotliCompressor::DEFAULT_QUALITY
}

fn default_brotli_window() -> u32 {
    BrotliCompressor::DEFAULT_WINDOW_BITS
}

fn default_zstd_level() -> i32 {
    ZstdCompressor::DEFAULT_LEVEL
}

fn default_deflate_level() -> u32 {
    DeflateCompressor::DEFAULT_LEVEL
}

pub fn build_compressor(settings: &CompressorSettings) -> Result<Box<dyn Compressor>> {
    Ok(match *settings {
        CompressorSettings::Brotli {
            quality,
            window_bits,
        } => Box::new(BrotliCompressor::new(quality, window_bits)?),
        CompressorSettings::Zstd { level } => Box::new(ZstdCompressor::new(level)?),
        CompressorSettings::Deflate { level } => Box::new(DeflateCompressor::new(level)?),
    })
}
