//! Data types for the generation pipeline.

use cairo::{Format, ImageSurface};
use thiserror::Error;

/// Errors that can occur while producing a raster.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Cairo surface error: {0}")]
    Surface(#[from] cairo::Error),

    #[error("Surface data is still borrowed: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),

    #[error("Raster allocation still failing after clearing caches {retries} times")]
    CacheExhausted { retries: u32 },
}

impl PipelineError {
    /// Whether freeing cached rasters might let a retry succeed.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, PipelineError::Surface(cairo::Error::NoMemory))
    }
}

/// A generated raster in Cairo's premultiplied ARGB32 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: i32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Copies the pixels out of a flushed image surface.
    pub fn from_surface(mut surface: ImageSurface) -> Result<Self, PipelineError> {
        surface.flush();
        let width = surface.width() as u32;
        let height = surface.height() as u32;
        let stride = surface.stride();
        let data = surface.data()?.to_vec();
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, `stride` bytes per row.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the premultiplied `0xAARRGGBB` pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * 4;
        let bytes = self.data.get(offset..offset + 4)?;
        Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Alpha channel of the pixel at `(x, y)`, 0 when out of bounds.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y).map_or(0, |pixel| (pixel >> 24) as u8)
    }

    /// Returns a copy with every premultiplied `0xAARRGGBB` pixel passed
    /// through `map`. Row padding is copied unchanged.
    pub fn map_pixels(&self, mut map: impl FnMut(u32) -> u32) -> Self {
        let mut data = self.data.clone();
        let row_bytes = self.width as usize * 4;
        for row in data.chunks_mut(self.stride as usize) {
            let row_len = row.len();
            for pixel in row[..row_bytes.min(row_len)].chunks_exact_mut(4) {
                let value = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
                pixel.copy_from_slice(&map(value).to_ne_bytes());
            }
        }
        Self {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data,
        }
    }

    /// Encodes the raster as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, PipelineError> {
        let surface = ImageSurface::create_for_data(
            self.data.clone(),
            Format::ARgb32,
            self.width as i32,
            self.height as i32,
            self.stride,
        )?;
        let mut buffer = Vec::new();
        surface.write_to_png(&mut buffer)?;
        Ok(buffer)
    }
}
