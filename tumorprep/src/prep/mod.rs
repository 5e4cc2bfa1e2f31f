pub mod assemble;
pub mod consts;
pub mod filter;
pub mod log;
pub mod modality;
pub mod normalize;
pub mod resize;
pub mod scan;
pub mod volume;

pub use assemble::{assemble, binarize, stack_channels, Sample};
pub use filter::{first_degenerate, is_degenerate};
pub use log::{AccTimer, ScanReport};
pub use modality::{mask_file_in, Modality};
pub use normalize::{dynamic_range, min_max, normalize_slice, Normalization};
pub use resize::{resize_linear, resize_nearest};
pub use scan::{DatasetScanner, Dataset, PatientState, ScanConfig, SkipReason, SliceMeta};
pub use volume::{Volume, VolumeSuffix};
