//! Overlapping character windows.

/// Split text into windows of `size` characters, each sharing `overlap`
/// characters with the previous one.
///
/// Text no longer than `size` comes back as a single window. An overlap
/// greater than or equal to `size` is treated as no overlap.
pub fn overlapping_windows(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let size = size.max(1);
    if chars.len() <= size {
        return vec![text.to_string()];
    }

    let step = if overlap < size { size - overlap } else { size };
    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    windows
}
