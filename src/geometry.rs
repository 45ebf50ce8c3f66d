use std::fmt;

/// Rectangle to keep, as `(left, top, right, bottom)` in pixels.
///
/// Coordinates are signed and unchecked; an inverted or out-of-range box is
/// only rejected (or padded) once it reaches [`crate::imageops::crop`]. They
/// are `i128` so any `i64` margin subtracted from a `u32` dimension fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: i128,
    pub top: i128,
    pub right: i128,
    pub bottom: i128,
}

impl CropBox {
    pub const fn new(left: i128, top: i128, right: i128, bottom: i128) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i128 {
        self.right.saturating_sub(self.left)
    }

    pub const fn height(&self) -> i128 {
        self.bottom.saturating_sub(self.top)
    }

    pub const fn is_inverted(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl From<[i64; 4]> for CropBox {
    fn from([left, top, right, bottom]: [i64; 4]) -> Self {
        Self::new(left.into(), top.into(), right.into(), bottom.into())
    }
}

/// Margins trimmed from each edge of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaveSpec {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl ShaveSpec {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl From<[i64; 4]> for ShaveSpec {
    fn from([left, top, right, bottom]: [i64; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

/// Converts shave margins into a crop box for an image of `dimensions`.
///
/// No bounds checking: margins wider than the image yield an inverted box.
pub const fn shave_to_box(dimensions: (u32, u32), shave: ShaveSpec) -> CropBox {
    let (width, height) = dimensions;
    CropBox::new(
        shave.left as i128,
        shave.top as i128,
        width as i128 - shave.right as i128,
        height as i128 - shave.bottom as i128,
    )
}

/// How the crop box for a single image is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropRegion {
    /// Same box for every image in the batch.
    Fixed(CropBox),
    /// Box recomputed from each image's own dimensions.
    Shave(ShaveSpec),
}

impl CropRegion {
    pub fn from_values(values: [i64; 4], shave: bool) -> Self {
        if shave {
            Self::Shave(values.into())
        } else {
            Self::Fixed(values.into())
        }
    }

    pub const fn resolve(&self, dimensions: (u32, u32)) -> CropBox {
        match *self {
            Self::Fixed(crop_box) => crop_box,
            Self::Shave(shave) => shave_to_box(dimensions, shave),
        }
    }
}
