pub mod assembler;
pub mod encoder;
pub mod fs_ops;
pub mod hyprcursor;
pub mod loader;
pub mod raster;
pub mod size_set;
pub mod xcursor;

pub use assembler::{Assembled, assemble, build_size_sets};
pub use encoder::{EncodedCursor, EncoderOptions, Format, ThemeEncoder};
