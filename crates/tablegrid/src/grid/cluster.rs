/// Merge nearby coordinates into single boundaries.
///
/// `values` must be sorted ascending. A value joins the current cluster when it is
/// within `tolerance` of the previous value, so a slowly drifting run of positions
/// stays one cluster. Each cluster collapses to its truncated mean.
pub fn cluster_coordinates(values: &[u32], tolerance: u32) -> Vec<u32> {
    let mut boundaries = Vec::new();
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    let mut previous: Option<u32> = None;

    for &value in values {
        if let Some(prev) = previous
            && value.abs_diff(prev) > tolerance
        {
            boundaries.push((sum / count) as u32);
            sum = 0;
            count = 0;
        }
        sum += u64::from(value);
        count += 1;
        previous = Some(value);
    }

    if count > 0 {
        boundaries.push((sum / count) as u32);
    }

    boundaries
}
