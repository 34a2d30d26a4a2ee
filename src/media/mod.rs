mod pixel_image;

pub use self::pixel_image::{PixelImage, PixelImageError};
