//! 评估指标。

use crate::error::{PrepError, Result};
use ndarray::{ArrayBase, Data, Dimension};

/// Dice平滑项。
pub const DICE_SMOOTH: f64 = 1e-6;

/// 两个{0, 1}掩膜的Dice系数：`(2|A ∩ B| + s) / (|A| + |B| + s)`。
pub fn dice_score<S1, S2, D>(truth: &ArrayBase<S1, D>, pred: &ArrayBase<S2, D>) -> Result<f64>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D: Dimension,
{
    if truth.shape() != pred.shape() {
        return Err(PrepError::MaskShapeMismatch(
            truth.shape().to_vec(),
            pred.shape().to_vec(),
        ));
    }
    let (mut intersection, mut sum_truth, mut sum_pred) = (0u64, 0u64, 0u64);
    for (&t, &p) in truth.iter().zip(pred.iter()) {
        intersection += u64::from(t) * u64::from(p);
        sum_truth += u64::from(t);
        sum_pred += u64::from(p);
    }
    Ok((2.0 * intersection as f64 + DICE_SMOOTH) / ((sum_truth + sum_pred) as f64 + DICE_SMOOTH))
}
