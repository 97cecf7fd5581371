//! The mapping between the pixel grid and the window of the complex
//! plane it depicts.  Row 0 is the top of the image, so the imaginary
//! axis is flipped relative to pixel y.

use complex::Complex;

/// A rectangular window of the complex plane together with the pixel
/// resolution it is rendered at.  Owned by the caller and passed by
/// value into every computation request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge of the window.
    pub re_min: f64,
    /// Right edge of the window.
    pub re_max: f64,
    /// Bottom edge of the window.
    pub im_min: f64,
    /// Top edge of the window.
    pub im_max: f64,
    /// Pixel columns.
    pub width: usize,
    /// Pixel rows.
    pub height: usize,
}

impl Viewport {
    /// Constructor.
    pub fn new(
        re_min: f64,
        re_max: f64,
        im_min: f64,
        im_max: f64,
        width: usize,
        height: usize,
    ) -> Viewport {
        Viewport {
            re_min,
            re_max,
            im_min,
            im_max,
            width,
            height,
        }
    }

    /// The complex point under pixel (x, y).  The corner pixels land
    /// exactly on the corners of the window: (0, 0) maps to
    /// (re_min, im_max) and (width-1, height-1) to (re_max, im_min).
    pub fn point_at(&self, x: usize, y: usize) -> Complex {
        let re = x as f64 / (self.width as f64 - 1.0) * (self.re_max - self.re_min) + self.re_min;
        let im = (self.height as f64 - 1.0 - y as f64) / (self.height as f64 - 1.0)
            * (self.im_max - self.im_min)
            + self.im_min;
        Complex::new(re, im)
    }

    /// The number of pixels, which is the length of a result buffer.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Whether the viewport contains no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
