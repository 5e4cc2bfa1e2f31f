use image::Rgb;
use std::collections::BTreeSet;

pub fn color_valid_rgb_hex(s: &str) -> Result<Rgb<u8>, &'static str> {
    const ERR: &str = "十六进制RGB颜色格式错误";
    fn ck(s: &str) -> Option<Rgb<u8>> {
        let r = u8::from_str_radix(s.get(0..=1)?, 16).ok()?;
        let g = u8::from_str_radix(s.get(2..=3)?, 16).ok()?;
        let b = u8::from_str_radix(s.get(4..=5)?, 16).ok()?;
        Some(Rgb::from([r, g, b]))
    }
    match s.len() {
        6 => ck(s).ok_or(ERR),
        7 if s.as_bytes()[0] == b'#' => ck(&s[1..]).ok_or(ERR),
        _ => Err(ERR),
    }
}

/// 形如`0-3,7`的样本序号范围，只保存端点。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleRanges(Vec<(usize, usize)>);

impl SampleRanges {
    /// 检查上界后展开为序号集合，`len`为样本总数。
    pub fn to_integers(&self, len: usize) -> Result<BTreeSet<usize>, String> {
        if let Some(&(_, end)) = self.0.iter().max_by_key(|&&(_, end)| end) {
            if end >= len {
                return Err(format!("sample {end} out of range (dataset has {len} samples)"));
            }
        }
        Ok(self.0.iter().flat_map(|&(d1, d2)| d1..=d2).collect())
    }
}

pub fn ranges_to_integers(s: &str) -> Result<SampleRanges, &'static str> {
    const ERR: &str = "整数范围格式错误";
    let mut ranges = Vec::new();
    for range in s.split(',') {
        let mut d_iter = range.trim().split('-');
        let d1: usize = d_iter.next().ok_or(ERR)?.parse().map_err(|_| ERR)?;
        let d2 = match d_iter.next() {
            Some(d2) => d2.parse().map_err(|_| ERR)?,
            None => d1,
        };
        if d2 < d1 || d_iter.next().is_some() {
            return Err(ERR);
        }
        ranges.push((d1, d2));
    }
    Ok(SampleRanges(ranges))
}

pub fn positive_usize(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a non-negative integer"))?;
    if v == 0 {
        return Err(format!("value must be positive, but got `{v}`"));
    }
    Ok(v)
}
