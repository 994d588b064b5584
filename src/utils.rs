//! Utility functions.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

//-----------------------------------------------------------------------------

/// Returns a name for a temporary file with the given prefix.
///
/// The name is unique within the process, and the process id keeps separate
/// processes from colliding.
pub fn temp_file_name(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut buf = std::env::temp_dir();
    buf.push(format!("{}_{}_{}", prefix, std::process::id(), count));
    buf
}

//-----------------------------------------------------------------------------

// Order statistics.

/// Returns the median of the values, or `None` if there are no values.
///
/// The slice is reordered in place. With an even number of values, the
/// upper of the two middle values is returned.
pub fn median(values: &mut [i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let mid = values.len() / 2;
    let (_, value, _) = values.select_nth_unstable(mid);
    Some(*value)
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_values() {
        assert_eq!(median(&mut []), None, "Median of an empty slice");
        assert_eq!(median(&mut [42]), Some(42), "Median of a single value");
        assert_eq!(median(&mut [3, 1, 2]), Some(2), "Median of three values");
        assert_eq!(median(&mut [4, 1, 3, 2]), Some(3), "Median of four values");
        let mut values = vec![30; 50];
        values.extend(vec![0; 10]);
        assert_eq!(median(&mut values), Some(30), "Median of a skewed distribution");
    }

    #[test]
    fn temp_file_names() {
        let first = temp_file_name("utils");
        let second = temp_file_name("utils");
        assert_ne!(first, second, "Temporary file names are not unique");
    }
}

//-----------------------------------------------------------------------------
