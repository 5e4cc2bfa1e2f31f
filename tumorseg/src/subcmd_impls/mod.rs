pub mod args;
mod dice;
mod extract;
mod inspect;
mod npy2png;
mod preview;
mod utils;

/// `extract`输出目录中的文件名。
const IMAGES_NPY: &str = "images.npy";
const MASKS_NPY: &str = "masks.npy";
const METADATA_JSON: &str = "metadata.json";
