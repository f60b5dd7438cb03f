//! Page geometry: scale transforms and rasterized page buffers

use crate::error::ViewerError;

/// Scale factors applied uniformly to every page of a document.
///
/// Both factors must be finite and strictly positive. `1.0 x 1.0` reproduces
/// a page at its native resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn new(scale_x: f32, scale_y: f32) -> Result<Self, ViewerError> {
        let transform = Self { scale_x, scale_y };
        transform.validate()?;
        Ok(transform)
    }

    /// Same factor on both axes.
    pub fn uniform(scale: f32) -> Result<Self, ViewerError> {
        Self::new(scale, scale)
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        let ok = |s: f32| s.is_finite() && s > 0.0;
        if ok(self.scale_x) && ok(self.scale_y) {
            Ok(())
        } else {
            Err(ViewerError::InvalidTransform {
                scale_x: self.scale_x,
                scale_y: self.scale_y,
            })
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Output pixel dimensions for a page of the given native size (in points)
/// under a transform: scaled, rounded to nearest, never below 1.
#[must_use]
pub fn scaled_dimensions(native_width: f32, native_height: f32, transform: Transform) -> (u32, u32) {
    let width = (native_width * transform.scale_x).round().max(1.0) as u32;
    let height = (native_height * transform.scale_y).round().max(1.0) as u32;
    (width, height)
}

/// One rasterized page: RGB samples, row-major, no alpha.
#[derive(Clone)]
pub struct Page {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Page {
    /// Wrap a fully populated RGB buffer. The buffer must hold exactly
    /// `width * height * 3` bytes; anything else is a backend fault.
    pub fn from_rgb(
        index: usize,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, ViewerError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ViewerError::rasterization(
                index,
                format!(
                    "bad pixel buffer: {}x{} with {} bytes, expected {expected}",
                    width,
                    height,
                    pixels.len()
                ),
            ));
        }
        Ok(Self {
            index,
            width,
            height,
            pixels,
        })
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_len", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_keeps_native_dimensions() {
        assert_eq!(
            scaled_dimensions(612.0, 792.0, Transform::IDENTITY),
            (612, 792)
        );
    }

    #[test]
    fn double_scale_doubles_dimensions() {
        let transform = Transform::new(2.0, 2.0).unwrap();
        assert_eq!(scaled_dimensions(612.0, 792.0, transform), (1224, 1584));
    }

    #[test]
    fn non_uniform_scale_applies_per_axis() {
        let transform = Transform::new(0.5, 2.0).unwrap();
        assert_eq!(scaled_dimensions(612.0, 792.0, transform), (306, 1584));
    }

    #[test]
    fn dimensions_never_drop_below_one() {
        let transform = Transform::new(0.001, 0.001).unwrap();
        assert_eq!(scaled_dimensions(10.0, 10.0, transform), (1, 1));
    }

    #[test]
    fn dimensions_round_to_nearest() {
        let transform = Transform::new(1.5, 1.5).unwrap();
        // 612 * 1.5 = 918, 793 * 1.5 = 1189.5 rounds to 1190
        assert_eq!(scaled_dimensions(612.0, 793.0, transform), (918, 1190));
    }

    #[test]
    fn zero_negative_and_nan_scales_are_rejected() {
        assert!(Transform::new(0.0, 1.0).is_err());
        assert!(Transform::new(1.0, -2.0).is_err());
        assert!(Transform::new(f32::NAN, 1.0).is_err());
        assert!(Transform::new(f32::INFINITY, 1.0).is_err());
        assert!(Transform::uniform(1.0).is_ok());
    }

    #[test]
    fn page_buffer_length_is_checked() {
        assert!(Page::from_rgb(0, 2, 2, vec![0; 12]).is_ok());
        assert!(Page::from_rgb(0, 2, 2, vec![0; 11]).is_err());
        assert!(Page::from_rgb(0, 0, 2, vec![]).is_err());
    }
}
