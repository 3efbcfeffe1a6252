//! Batch partitioning for `batchUpdate` requests.

/// Split `items` into ordered batches of at most `max` elements.
///
/// A list longer than `max` is halved at `len / 2` and each half is split
/// again on its own, so 150 items with `max = 60` become 37, 38, 37, 38.
/// Concatenating the result gives back the input.
pub fn partition<T>(items: Vec<T>, max: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::new();
    split_into(items, max.max(1), &mut batches);
    batches
}

fn split_into<T>(mut items: Vec<T>, max: usize, out: &mut Vec<Vec<T>>) {
    if items.len() > max {
        let second = items.split_off(items.len() / 2);
        split_into(items, max, out);
        split_into(second, max, out);
    } else if !items.is_empty() {
        out.push(items);
    }
}
