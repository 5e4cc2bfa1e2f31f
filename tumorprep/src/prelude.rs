pub use super::error::{PrepError, Result};
pub use super::metrics::dice_score;
pub use super::model::{ModelHandle, SegmentationModel};
pub use super::prep::consts::{
    CHANNELS, NUM_SLICES, PREDICTION_THRESHOLD, STRIDE, TARGET_HEIGHT, TARGET_WIDTH,
};
pub use super::prep::{
    DatasetScanner, Dataset, Modality, Normalization, Sample, ScanConfig, ScanReport, SliceMeta,
    Volume,
};
pub use super::viewer::{Upload, ViewerInput, ViewerSession};
