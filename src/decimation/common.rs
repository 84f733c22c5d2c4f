/// Scans a bucket for its smallest and largest sample.
/// NaN samples are gaps and are skipped; a bucket holding nothing but
/// gaps has no extent.
#[inline(always)]
pub fn bucket_min_max(chunk: &[f64]) -> Option<(f64, f64)> {
    let mut iter = chunk.iter().copied().skip_while(|v| v.is_nan());
    let first = iter.next()?;
    let mut min_y = first;
    let mut max_y = first;

    for val in iter {
        if val.is_nan() {
            continue;
        }
        if val < min_y {
            min_y = val;
        } else if val > max_y {
            max_y = val;
        }
    }

    Some((min_y, max_y))
}
