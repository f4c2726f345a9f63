/// Power-of-two ARGB texture maps.
/// Texel rows are addressed with a shift by `log2_width` instead of a multiply.
use crate::error::TextureError;

/// Largest supported texture edge. Perspective texturing keeps u and v with
/// 22 fractional bits, which leaves 9 integer bits.
pub const MAX_TEXTURE_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct Texture {
    width: usize,
    height: usize,
    log2_width: u32,
    // width - 1 / height - 1, used to wrap lookups
    width_mask: i32,
    height_mask: i32,
    texels: Vec<u32>,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<u32>) -> Result<Self, TextureError> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(TextureError::NotPowerOfTwo { width, height });
        }
        if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(TextureError::TooLarge {
                width,
                height,
                max: MAX_TEXTURE_SIZE,
            });
        }
        if texels.len() != width * height {
            return Err(TextureError::TexelCountMismatch {
                expected: width * height,
                actual: texels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            log2_width: width.trailing_zeros(),
            width_mask: width as i32 - 1,
            height_mask: height as i32 - 1,
            texels,
        })
    }

    /// Solid single-color texture.
    pub fn solid(size: usize, color: u32) -> Result<Self, TextureError> {
        Self::new(size, size, vec![color; size * size])
    }

    /// Two-color checkerboard with square cells of `cell` texels.
    pub fn checkerboard(size: usize, cell: usize, a: u32, b: u32) -> Result<Self, TextureError> {
        let cell = cell.max(1);
        let mut texels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                texels.push(if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b });
            }
        }
        Self::new(size, size, texels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn log2_width(&self) -> u32 {
        self.log2_width
    }

    pub fn texels(&self) -> &[u32] {
        &self.texels
    }

    /// Fetch the texel at integer coordinates.
    /// Coordinates wrap with the power-of-two masks.
    #[inline(always)]
    pub fn texel(&self, u: i32, v: i32) -> u32 {
        let index = (((v & self.height_mask) << self.log2_width) | (u & self.width_mask)) as usize;
        self.texels[index]
    }

    /// Point sample from fixed-point coordinates with `shift` fractional bits.
    #[inline(always)]
    pub fn sample(&self, u: i32, v: i32, shift: u32) -> u32 {
        self.texel(u >> shift, v >> shift)
    }

    /// Bilinear sample from fixed-point coordinates with `shift` fractional
    /// bits. The top 8 fractional bits weight the four neighbouring texels.
    #[inline]
    pub fn sample_bilinear(&self, u: i32, v: i32, shift: u32) -> u32 {
        let ui = u >> shift;
        let vi = v >> shift;
        let fu = ((u >> (shift - 8)) & 0xFF) as u32;
        let fv = ((v >> (shift - 8)) & 0xFF) as u32;

        let t00 = self.texel(ui, vi);
        let t10 = self.texel(ui + 1, vi);
        let t01 = self.texel(ui, vi + 1);
        let t11 = self.texel(ui + 1, vi + 1);

        let w00 = (256 - fu) * (256 - fv);
        let w10 = fu * (256 - fv);
        let w01 = (256 - fu) * fv;
        let w11 = fu * fv;

        let channel = |s: u32| {
            let c = |t: u32| (t >> s) & 0xFF;
            (c(t00) * w00 + c(t10) * w10 + c(t01) * w01 + c(t11) * w11) >> 16
        };

        0xFF000000 | (channel(16) << 16) | (channel(8) << 8) | channel(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two() {
        let err = Texture::new(3, 4, vec![0; 12]).unwrap_err();
        assert_eq!(err, TextureError::NotPowerOfTwo { width: 3, height: 4 });
    }

    #[test]
    fn rejects_oversized_and_short_texel_data() {
        assert!(matches!(
            Texture::new(512, 512, vec![0; 512 * 512]),
            Err(TextureError::TooLarge { .. })
        ));
        assert_eq!(
            Texture::new(4, 4, vec![0; 15]).unwrap_err(),
            TextureError::TexelCountMismatch { expected: 16, actual: 15 }
        );
    }

    #[test]
    fn texel_lookup_uses_row_shift_and_wraps() {
        let texels: Vec<u32> = (0..32).collect();
        let tex = Texture::new(8, 4, texels).unwrap();
        assert_eq!(tex.log2_width(), 3);
        assert_eq!(tex.texel(3, 2), 19);
        assert_eq!(tex.texel(8 + 3, 4 + 2), 19);
        assert_eq!(tex.sample(3 << 16, 2 << 16, 16), 19);
        assert_eq!(tex.sample(3 << 22, 2 << 22, 22), 19);
    }

    #[test]
    fn bilinear_is_exact_on_texel_centers_and_mixes_between() {
        let tex = Texture::checkerboard(2, 1, 0xFF000000, 0xFFFFFFFF).unwrap();
        assert_eq!(tex.sample_bilinear(0, 0, 16), 0xFF000000);
        assert_eq!(tex.sample_bilinear(1 << 16, 0, 16), 0xFFFFFFFF);

        let mid = tex.sample_bilinear(1 << 15, 0, 16);
        let r = (mid >> 16) & 0xFF;
        assert!((126..=128).contains(&r), "half-way sample should be grey, got {:#x}", mid);
    }
}
