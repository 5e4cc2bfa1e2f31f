//! 合成病例目录上的端到端扫描。

use ndarray::{Array, Array3, Axis};
use nifti::writer::WriterOptions;
use std::fs;
use std::path::Path;
use tumorprep::prelude::*;

fn write_volume(path: &Path, data: &Array3<f32>) {
    WriterOptions::new(path).write_nifti(data).unwrap();
}

fn write_patient(root: &Path, id: &str, depth: usize) {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    for (seed, modality) in Modality::ALL.iter().enumerate() {
        let volume = Array::from_shape_fn((128, 128, depth), |(x, y, z)| {
            ((x * (seed + 2) + y * 3 + z * 11) % 200) as f32 * 10.0 + seed as f32
        });
        write_volume(
            &dir.join(format!("{id}_{}.nii", modality.suffix())),
            &volume,
        );
    }
    let mask = Array::from_shape_fn((128, 128, depth), |(x, y, _)| {
        if (40..80).contains(&x) && (50..90).contains(&y) {
            4.0
        } else if x < 10 {
            1.0
        } else {
            0.0
        }
    });
    write_volume(&dir.join(format!("{id}_seg.nii")), &mask);
}

#[test]
fn synthetic_patient_yields_two_samples() {
    let root = tempfile::tempdir().unwrap();
    write_patient(root.path(), "BraTS20_Training_001", 10);

    let config = ScanConfig {
        num_slices: 10,
        stride: 5,
        ..ScanConfig::default()
    };
    let dataset = DatasetScanner::new(root.path(), config).scan().unwrap();
    assert_eq!(dataset.len(), 2);

    let (images, masks, metadata) = dataset.into_arrays().unwrap();
    assert_eq!(images.shape(), &[2, 128, 128, 4]);
    assert_eq!(masks.shape(), &[2, 128, 128, 1]);
    assert!(images.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(masks.iter().all(|&v| v == 0 || v == 1));

    let indices: Vec<usize> = metadata.iter().map(|m| m.depth_index).collect();
    assert_eq!(indices, vec![0, 5]);
    assert!(metadata
        .iter()
        .all(|m| m.patient_id == "BraTS20_Training_001"));

    for image in images.axis_iter(Axis(0)) {
        for channel in image.axis_iter(Axis(2)) {
            let lo = channel.fold(f32::INFINITY, |a, &b| a.min(b));
            let hi = channel.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            assert!(lo.abs() < 1e-6);
            assert!((hi - 1.0).abs() < 1e-6);
        }
    }
    assert_eq!(masks[(0, 60, 70, 0)], 1);
    assert_eq!(masks[(0, 5, 100, 0)], 1);
    assert_eq!(masks[(1, 100, 20, 0)], 0);
}

#[test]
fn incomplete_patients_contribute_nothing() {
    let root = tempfile::tempdir().unwrap();
    write_patient(root.path(), "complete", 10);
    write_patient(root.path(), "no_t2", 10);
    fs::remove_file(root.path().join("no_t2").join("no_t2_t2.nii")).unwrap();
    write_patient(root.path(), "no_seg", 10);
    fs::remove_file(root.path().join("no_seg").join("no_seg_seg.nii")).unwrap();

    let config = ScanConfig {
        num_slices: 10,
        stride: 5,
        ..ScanConfig::default()
    };
    let (dataset, report) = DatasetScanner::new(root.path(), config)
        .scan_with_report()
        .unwrap();
    assert_eq!(report.patients, 3);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.extracted, 1);
    assert_eq!(dataset.len(), 2);
    assert!(dataset.metadata().iter().all(|m| m.patient_id == "complete"));
}

#[test]
fn count_matches_non_degenerate_indices() {
    let root = tempfile::tempdir().unwrap();
    let id = "p";
    write_patient(root.path(), id, 12);
    // 在深度3和9处把T1置为常数
    let path = root.path().join(id).join("p_t1.nii");
    let mut t1 = Array::from_shape_fn((128, 128, 12), |(x, y, z)| (x + y + z) as f32);
    for z in [3, 9] {
        t1.index_axis_mut(Axis(2), z).fill(0.0);
    }
    write_volume(&path, &t1);

    let config = ScanConfig {
        num_slices: 12,
        stride: 3,
        ..ScanConfig::default()
    };
    let dataset = DatasetScanner::new(root.path(), config).scan().unwrap();
    let indices: Vec<usize> = dataset.metadata().iter().map(|m| m.depth_index).collect();
    assert_eq!(indices, vec![0, 6]);
}
