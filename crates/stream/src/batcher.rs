//! Fixed-size row batching
//!
//! Groups a row iterator into batches for columnar encoding. Single pass:
//! only the batch currently being filled is held in memory, so the input
//! sequence can be arbitrarily large.

use thiserror::Error;

/// Rejected batch size.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("batch size must be at least 1, got {0}")]
pub struct BatchSizeError(pub usize);

/// Group `rows` into batches of `size`.
///
/// Every batch has exactly `size` rows except possibly the last, which has
/// between 1 and `size`. Batches preserve input order and concatenating
/// them reproduces the input. Fails fast on a zero size, before any row is
/// consumed.
pub fn batched<I>(rows: I, size: usize) -> Result<Batcher<I::IntoIter>, BatchSizeError>
where
    I: IntoIterator,
{
    if size < 1 {
        return Err(BatchSizeError(size));
    }
    Ok(Batcher {
        rows: rows.into_iter(),
        size,
    })
}

/// Iterator over fixed-size batches, see [`batched`].
pub struct Batcher<I> {
    rows: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batcher<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::new();
        for _ in 0..self.size {
            match self.rows.next() {
                Some(row) => batch.push(row),
                None => break,
            }
        }
        if batch.is_empty() { None } else { Some(batch) }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_exact_multiple() {
        let batches: Vec<_> = batched(0..6, 2).unwrap().collect();
        assert_eq!(batches, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_short_final_batch() {
        let batches: Vec<_> = batched(0..7, 3).unwrap().collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2], vec![6]);
    }

    #[test]
    fn test_count_order_and_sizes_hold_for_all_inputs() {
        for n in 0..=25usize {
            for k in 1..=5usize {
                let batches: Vec<Vec<usize>> = batched(0..n, k).unwrap().collect();

                assert_eq!(batches.len(), n.div_ceil(k), "n={n} k={k}");
                if let Some((last, full)) = batches.split_last() {
                    assert!(full.iter().all(|b| b.len() == k), "n={n} k={k}");
                    assert!(last.len() >= 1 && last.len() <= k, "n={n} k={k}");
                }

                let rejoined: Vec<usize> = batches.into_iter().flatten().collect();
                assert_eq!(rejoined, (0..n).collect::<Vec<_>>(), "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = batched(0..10, 0).map(|_| ()).unwrap_err();
        assert_eq!(err, BatchSizeError(0));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let mut batches = batched(std::iter::empty::<u8>(), 4).unwrap();
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_size_one() {
        let batches: Vec<_> = batched(0..3, 1).unwrap().collect();
        assert_eq!(batches, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_single_pass_does_not_read_ahead() {
        let pulled = Cell::new(0usize);
        let rows = (0..100).inspect(|_| pulled.set(pulled.get() + 1));

        let mut batches = batched(rows, 10).unwrap();
        batches.next();

        // exactly one batch worth of rows has been consumed
        assert_eq!(pulled.get(), 10);
    }
}
