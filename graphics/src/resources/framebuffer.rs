//! Software framebuffer planes.

/// Bytes per pixel in every framebuffer plane.
pub const PLANE_BYTES_PER_PIXEL: usize = 4;

/// A renderable surface: four planes of `4 x width x height` bytes.
///
/// The color and stencil planes hold one 32-bit word per pixel, the depth
/// plane one `f32` per pixel. The accumulation plane is allocated but only
/// ever touched by clients reading it back.
#[derive(Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<u8>,
    accum: Vec<u8>,
    stencil: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a zeroed framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let size = Self::plane_size(width, height);
        Self {
            width,
            height,
            color: vec![0; size],
            depth: vec![0; size],
            accum: vec![0; size],
            stencil: vec![0; size],
        }
    }

    fn plane_size(width: u32, height: u32) -> usize {
        PLANE_BYTES_PER_PIXEL * width as usize * height as usize
    }

    /// Reallocate every plane for new dimensions. Contents are zeroed.
    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Get the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels per plane.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw color plane.
    pub fn color(&self) -> &[u8] {
        &self.color
    }

    /// Raw depth plane.
    pub fn depth(&self) -> &[u8] {
        &self.depth
    }

    /// Raw accumulation plane.
    pub fn accum(&self) -> &[u8] {
        &self.accum
    }

    /// Raw stencil plane.
    pub fn stencil(&self) -> &[u8] {
        &self.stencil
    }

    /// Packed color word of the pixel at `index`.
    pub fn color_at(&self, index: usize) -> Option<u32> {
        read_word(&self.color, index).map(u32::from_ne_bytes)
    }

    /// Depth value of the pixel at `index`.
    pub fn depth_at(&self, index: usize) -> Option<f32> {
        read_word(&self.depth, index).map(f32::from_ne_bytes)
    }

    /// Stencil word of the pixel at `index`.
    pub fn stencil_at(&self, index: usize) -> Option<u32> {
        read_word(&self.stencil, index).map(u32::from_ne_bytes)
    }

    pub(crate) fn fill_color(&mut self, color: u32) {
        fill_words(&mut self.color, color.to_ne_bytes());
    }

    pub(crate) fn fill_depth(&mut self, depth: f32) {
        fill_words(&mut self.depth, depth.to_ne_bytes());
    }

    pub(crate) fn fill_stencil(&mut self, stencil: u32) {
        fill_words(&mut self.stencil, stencil.to_ne_bytes());
    }
}

fn read_word(plane: &[u8], index: usize) -> Option<[u8; 4]> {
    let start = index.checked_mul(PLANE_BYTES_PER_PIXEL)?;
    let bytes = plane.get(start..start + PLANE_BYTES_PER_PIXEL)?;
    bytes.try_into().ok()
}

fn fill_words(plane: &mut [u8], word: [u8; 4]) {
    for pixel in plane.chunks_exact_mut(PLANE_BYTES_PER_PIXEL) {
        pixel.copy_from_slice(&word);
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
