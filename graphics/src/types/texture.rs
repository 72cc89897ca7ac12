//! Texture formats.

/// Texture format enumeration.
///
/// The size table gives bytes per pixel for the uncompressed formats. The
/// compressed formats carry a nominal weight only; the software device
/// stores them unpacked at that weight and never decodes blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Single 8-bit luminance channel.
    Luminance,
    /// 8-bit RGB channels.
    Rgb,
    /// 8-bit RGBA channels.
    #[default]
    Rgba,
    /// DXT1-compressed RGB.
    RgbDxt1,
    /// DXT1-compressed RGBA.
    RgbaDxt1,
    /// DXT3-compressed RGBA.
    RgbaDxt3,
    /// DXT5-compressed RGBA.
    RgbaDxt5,
}

impl TextureFormat {
    /// Returns true if this is a block-compressed format.
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            Self::RgbDxt1 | Self::RgbaDxt1 | Self::RgbaDxt3 | Self::RgbaDxt5
        )
    }

    /// Returns the size in bytes per pixel (nominal for compressed formats).
    pub const fn size(&self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::Rgb | Self::RgbDxt1 => 3,
            Self::Rgba | Self::RgbaDxt1 | Self::RgbaDxt3 | Self::RgbaDxt5 => 4,
        }
    }

    /// Byte size of a `width` x `height` image in this format.
    pub fn image_size(&self, width: u32, height: u32) -> usize {
        self.size() * width as usize * height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sizes() {
        assert_eq!(TextureFormat::Luminance.size(), 1);
        assert_eq!(TextureFormat::Rgb.size(), 3);
        assert_eq!(TextureFormat::Rgba.size(), 4);
        assert_eq!(TextureFormat::RgbDxt1.size(), 3);
        assert_eq!(TextureFormat::RgbaDxt5.size(), 4);
    }

    #[test]
    fn test_image_size() {
        assert_eq!(TextureFormat::Rgb.image_size(4, 2), 24);
        assert!(TextureFormat::RgbaDxt3.is_compressed());
        assert!(!TextureFormat::Luminance.is_compressed());
    }
}
