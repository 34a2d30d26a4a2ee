use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::handlers::PixelCoordinate;

const PIXEL_ON: char = '1';

/// Errors returned when loading a text bitmap.
#[derive(Debug, Error)]
pub enum PixelImageError {
    /// The file could not be read.
    #[error("failed to read picture `{path}`")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// An on-pixel sits outside the one-byte coordinate range.
    #[error("picture pixel at column {column}, row {row} is beyond coordinate 255")]
    OutOfRange { column: usize, row: usize },
}

/// Binary picture parsed from text: one line per row, `1` marks an on-pixel.
///
/// ```
/// use macropad_oled::{PixelCoordinate, PixelImage};
///
/// let image: PixelImage = "010\n001\n".parse()?;
/// assert_eq!(
///     vec![PixelCoordinate::new(1, 0), PixelCoordinate::new(2, 1)],
///     image.on_pixels()
/// );
/// # Ok::<(), macropad_oled::PixelImageError>(())
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PixelImage {
    on_pixels: Vec<PixelCoordinate>,
    width: usize,
    height: usize,
}

impl PixelImage {
    /// Reads and parses a picture file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or an on-pixel does not
    /// fit a coordinate byte.
    pub fn read(path: &Path) -> Result<Self, PixelImageError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PixelImageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        contents.parse()
    }

    /// Returns on-pixels in row-major order.
    #[must_use]
    pub fn on_pixels(&self) -> Vec<PixelCoordinate> {
        self.on_pixels.clone()
    }

    /// Returns the longest row length in characters.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }
}

impl FromStr for PixelImage {
    type Err = PixelImageError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        let mut image = Self::default();
        for (row, line) in contents.lines().enumerate() {
            image.height = row + 1;
            let mut columns = 0;
            for (column, character) in line.chars().enumerate() {
                columns = column + 1;
                if character != PIXEL_ON {
                    continue;
                }
                let (Ok(x), Ok(y)) = (u8::try_from(column), u8::try_from(row)) else {
                    return Err(PixelImageError::OutOfRange { column, row });
                };
                image.on_pixels.push(PixelCoordinate::new(x, y));
            }
            image.width = image.width.max(columns);
        }
        Ok(image)
    }
}
