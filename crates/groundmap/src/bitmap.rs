//! Walkability bitmaps
//!
//! A pixel is walkable when its three color channels are equal. The shared
//! grey level doubles as a depth cue, so the mask keeps it around for the
//! depth sampler.

use groundmap_common::{Error, Point, Result};

/// Decoded pixel grid supplied by the asset loader
pub trait GroundBitmap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// RGB channels of pixel `(x, y)`; both coordinates are in range
    fn rgb(&self, x: u32, y: u32) -> [u8; 3];
}

/// Owned RGB bitmap, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBitmap {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl RgbBitmap {
    /// Creates a bitmap filled with one color
    pub fn new(width: u32, height: u32, fill: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Creates a bitmap by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps packed RGB bytes (3 bytes per pixel, row-major)
    pub fn from_raw(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::MalformedBitmap(format!(
                "expected {expected} bytes for {width}x{height} RGB, got {}",
                data.len()
            )));
        }
        let pixels = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = rgb;
    }
}

impl GroundBitmap for RgbBitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * self.width + x) as usize]
    }
}

#[cfg(feature = "image")]
impl GroundBitmap for image::RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.get_pixel(x, y).0
    }
}

#[cfg(feature = "image")]
impl GroundBitmap for image::RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        [r, g, b]
    }
}

/// Decodes an image file (any format enabled in `image`) as RGB
#[cfg(feature = "image")]
pub fn load_bitmap<P: AsRef<std::path::Path>>(path: P) -> Result<image::RgbImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| Error::MalformedBitmap(format!("{}: {e}", path.display())))?;
    Ok(img.to_rgb8())
}

/// Immutable walkability mask with the grey level of walkable pixels
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DepthMask {
    width: u32,
    height: u32,
    cells: Vec<Option<u8>>,
}

impl DepthMask {
    /// Reduces a bitmap to its walkability mask.
    ///
    /// Fails on an empty bitmap or one without any walkable pixel.
    pub fn from_bitmap<B: GroundBitmap + ?Sized>(bitmap: &B) -> Result<Self> {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width == 0 || height == 0 {
            return Err(Error::MalformedBitmap(format!(
                "bitmap has no pixels ({width}x{height})"
            )));
        }

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = bitmap.rgb(x, y);
                cells.push((r == g && g == b).then_some(r));
            }
        }

        let mask = Self {
            width,
            height,
            cells,
        };
        if mask.walkable_count() == 0 {
            return Err(Error::MalformedBitmap(
                "bitmap has no walkable (grey) pixel".to_string(),
            ));
        }
        Ok(mask)
    }

    pub(crate) fn from_cells(width: u32, height: u32, cells: Vec<Option<u8>>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn cells(&self) -> &[Option<u8>] {
        &self.cells
    }

    /// Grey level of pixel `(x, y)`, `None` when out of range or not walkable
    #[inline]
    pub fn channel(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.cells[(y * self.width as i64 + x) as usize]
    }

    #[inline]
    pub fn is_walkable(&self, x: i64, y: i64) -> bool {
        self.channel(x, y).is_some()
    }

    /// Pixel containing a scene point, if inside the bitmap
    pub fn pixel_of(&self, p: Point) -> Option<(i64, i64)> {
        if !p.is_finite() {
            return None;
        }
        let (x, y) = (p.x.round() as i64, p.y.round() as i64);
        (x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64).then_some((x, y))
    }

    /// Grey level under a scene point, `None` off the walkable area
    pub fn channel_at(&self, p: Point) -> Option<u8> {
        self.pixel_of(p).and_then(|(x, y)| self.channel(x, y))
    }

    /// Grey level of the pixel nearest to `p`, clamping into the bitmap
    pub fn clamped_channel(&self, p: Point) -> Option<u8> {
        if !p.is_finite() {
            return None;
        }
        let x = (p.x.round() as i64).clamp(0, self.width as i64 - 1);
        let y = (p.y.round() as i64).clamp(0, self.height as i64 - 1);
        self.channel(x, y)
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
