//! 数据集扫描：遍历病例目录，按步长提取多模态切片样本。
//!
//! 目录结构：
//!
//! ```text
//! root/
//!   {patient_id}/
//!     {patient_id}_flair.nii
//!     {patient_id}_t1.nii
//!     {patient_id}_t1ce.nii
//!     {patient_id}_t2.nii
//!     {patient_id}_seg.nii
//! ```
//!
//! 缺少任一文件的病例会被静默跳过；文件存在但无法解码时返回错误并终止扫描。

use super::assemble::{assemble, Sample};
use super::consts::{CHANNELS, NUM_SLICES, STRIDE, TARGET_HEIGHT, TARGET_WIDTH};
use super::filter::first_degenerate;
use super::log::ScanReport;
use super::modality::{mask_file_in, Modality};
use super::volume::Volume;
use crate::error::{PrepError, Result};
use ndarray::{stack, Array3, Array4, ArrayView3, Axis};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// 扫描参数。
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// 深度索引上界（不含）。
    pub num_slices: usize,
    /// 深度索引步长。
    pub stride: usize,
    /// 目标分辨率(height, width)。
    pub target: (usize, usize),
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_slices: NUM_SLICES,
            stride: STRIDE,
            target: (TARGET_HEIGHT, TARGET_WIDTH),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(PrepError::InvalidConfig("stride must be positive"));
        }
        if self.target.0 == 0 || self.target.1 == 0 {
            return Err(PrepError::InvalidConfig("target size must be positive"));
        }
        Ok(())
    }

    /// 待检查的深度索引：`0, stride, 2 * stride, ... < num_slices`。
    pub fn depth_indices(&self) -> impl Iterator<Item = usize> {
        (0..self.num_slices).step_by(self.stride)
    }
}

/// 样本来源：病例ID与深度索引。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceMeta {
    pub patient_id: String,
    pub depth_index: usize,
}

/// 按插入顺序排列的样本集合，图像、掩膜与元数据三者等长。
#[derive(Clone, Debug)]
pub struct Dataset {
    target: (usize, usize),
    images: Vec<Array3<f32>>,
    masks: Vec<Array3<u8>>,
    metadata: Vec<SliceMeta>,
}

impl Dataset {
    pub fn new(target: (usize, usize)) -> Self {
        Self {
            target,
            images: Vec::new(),
            masks: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample, meta: SliceMeta) {
        self.images.push(sample.image);
        self.masks.push(sample.mask);
        self.metadata.push(meta);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    #[inline]
    pub fn metadata(&self) -> &[SliceMeta] {
        &self.metadata
    }

    /// 转换为定长数组：图像(N, H, W, 4)，掩膜(N, H, W, 1)，以及N条元数据。
    pub fn into_arrays(self) -> Result<(Array4<f32>, Array4<u8>, Vec<SliceMeta>)> {
        let (h, w) = self.target;
        if self.is_empty() {
            return Ok((
                Array4::zeros((0, h, w, CHANNELS)),
                Array4::zeros((0, h, w, 1)),
                self.metadata,
            ));
        }
        let images: Vec<ArrayView3<f32>> = self.images.iter().map(|a| a.view()).collect();
        let masks: Vec<ArrayView3<u8>> = self.masks.iter().map(|a| a.view()).collect();
        Ok((
            stack(Axis(0), &images)?,
            stack(Axis(0), &masks)?,
            self.metadata,
        ))
    }
}

/// 病例被跳过的原因。
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingModality(Modality),
    MissingMask,
}

/// 单个病例的处理状态。
///
/// `Scanning -> ModalitiesComplete -> MaskFound -> SlicesExtracted`，
/// 缺少模态或标注时提前进入`Skipped`。
#[derive(Debug)]
pub enum PatientState {
    Scanning,
    /// 四个模态均已加载，按通道顺序排列。
    ModalitiesComplete(Vec<Volume>),
    MaskFound {
        modalities: Vec<Volume>,
        mask: Volume,
    },
    /// 终态：提取了若干（可能为0）个样本。
    SlicesExtracted(usize),
    /// 终态：未提取任何样本，也不报错。
    Skipped(SkipReason),
}

/// 单个病例处理结束时的结果。
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Outcome {
    Extracted(usize),
    Skipped(SkipReason),
}

struct PatientScan<'a> {
    dir: &'a Path,
    /// 目录名原文，用于拼接文件路径。
    name: &'a OsStr,
    /// 用于日志与元数据的病例ID。
    id: &'a str,
    config: &'a ScanConfig,
}

impl<'a> PatientScan<'a> {
    fn run(&self, dataset: &mut Dataset, report: &mut ScanReport) -> Result<Outcome> {
        let mut state = PatientState::Scanning;
        loop {
            state = match self.step(state, dataset, report)? {
                PatientState::SlicesExtracted(n) => return Ok(Outcome::Extracted(n)),
                PatientState::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
                next => next,
            };
        }
    }

    fn step(
        &self,
        state: PatientState,
        dataset: &mut Dataset,
        report: &mut ScanReport,
    ) -> Result<PatientState> {
        match state {
            PatientState::Scanning => {
                let mut modalities = Vec::with_capacity(CHANNELS);
                for modality in Modality::ALL {
                    let path = modality.file_in(self.dir, self.name);
                    if !path.exists() {
                        return Ok(PatientState::Skipped(SkipReason::MissingModality(modality)));
                    }
                    report.load_timer.start();
                    modalities.push(Volume::open(path)?);
                    report.load_timer.elapsed();
                }
                Ok(PatientState::ModalitiesComplete(modalities))
            }
            PatientState::ModalitiesComplete(modalities) => {
                let path = mask_file_in(self.dir, self.name);
                if !path.exists() {
                    return Ok(PatientState::Skipped(SkipReason::MissingMask));
                }
                report.load_timer.start();
                let mask = Volume::open(path)?;
                report.load_timer.elapsed();
                Ok(PatientState::MaskFound { modalities, mask })
            }
            PatientState::MaskFound { modalities, mask } => {
                report.assemble_timer.start();
                let extracted = self.extract(&modalities, &mask, dataset, report);
                report.assemble_timer.elapsed();
                Ok(PatientState::SlicesExtracted(extracted?))
            }
            terminal => Ok(terminal),
        }
    }

    fn extract(
        &self,
        modalities: &[Volume],
        mask: &Volume,
        dataset: &mut Dataset,
        report: &mut ScanReport,
    ) -> Result<usize> {
        let mut extracted = 0;
        for depth_index in self.config.depth_indices() {
            let slices = [
                modalities[0].slice(depth_index)?,
                modalities[1].slice(depth_index)?,
                modalities[2].slice(depth_index)?,
                modalities[3].slice(depth_index)?,
            ];
            if let Some(modality) = first_degenerate(&slices) {
                debug!(patient = self.id, depth_index, %modality, "degenerate slice skipped");
                report.degenerate += 1;
                continue;
            }

            let sample = assemble(&slices, mask.slice(depth_index)?, self.config.target)?;
            dataset.push(
                sample,
                SliceMeta {
                    patient_id: self.id.to_owned(),
                    depth_index,
                },
            );
            extracted += 1;
        }
        Ok(extracted)
    }
}

/// 数据集扫描器。
#[derive(Clone, Debug)]
pub struct DatasetScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl DatasetScanner {
    #[inline]
    pub fn new<P: AsRef<Path>>(root: P, config: ScanConfig) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self) -> Result<Dataset> {
        self.scan_with_report().map(|(dataset, _)| dataset)
    }

    /// 扫描根目录下所有病例目录（按目录列举顺序，不排序）。
    pub fn scan_with_report(&self) -> Result<(Dataset, ScanReport)> {
        self.config.validate()?;
        let mut dataset = Dataset::new(self.config.target);
        let mut report = ScanReport::default();

        for entry in WalkDir::new(self.root.as_path()).min_depth(1).max_depth(1) {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let id = name.to_string_lossy();
            report.patients += 1;
            info!(patient = %id, "processing patient");

            let patient = PatientScan {
                dir,
                name,
                id: &id,
                config: &self.config,
            };
            match patient.run(&mut dataset, &mut report)? {
                Outcome::Extracted(n) => {
                    debug!(patient = %id, samples = n, "slices extracted");
                    report.extracted += 1;
                    report.samples += n;
                }
                Outcome::Skipped(reason) => {
                    debug!(patient = %id, ?reason, "patient skipped");
                    report.skipped += 1;
                }
            }
        }

        report.summary();
        Ok((dataset, report))
    }
}
