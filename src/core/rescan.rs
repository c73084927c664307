//! Pagination over a post-filtered row stream.
//!
//! When the filter predicate can only be evaluated after a row is fetched, the
//! matching rows are a sparse subset of the stored rows and page `n` of the
//! filtered result does not start at any offset computable up front. `Rescan`
//! walks synthetic pages 1..=n from the start of the store, carrying overflow
//! from one page into the next, until the target page is assembled.
//!
//! The machine performs no I/O. Callers loop on [`Rescan::poll`], perform the
//! requested fetch and hand the rows back through [`Rescan::feed`]:
//!
//! ```
//! use numbersvc::core::rescan::{Rescan, Step};
//!
//! let rows: Vec<u32> = (1..=20).collect();
//! let mut scan = Rescan::new(2, 3);
//! while let Step::Fetch { offset, count } = scan.poll() {
//!     let chunk = rows.iter().skip(offset).take(count).copied().collect();
//!     scan.feed(chunk, |n: u32| (n % 2 == 0).then_some(n));
//! }
//! let page = scan.finish();
//! assert_eq!(page.items, vec![8, 10, 12]);
//! assert!(page.has_next);
//! assert!(page.has_prev);
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still assembling synthetic page `current_page`.
    Accumulating,
    /// The store ran dry before the target page; the result is empty.
    Exhausted,
    /// Passed the target page.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch { offset: usize, count: usize },
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug)]
pub struct Rescan<T> {
    target_page: usize,
    limit: usize,
    current_page: usize,
    offset: usize,
    buffer: Vec<T>,
    page_open: bool,
    source_more: bool,
    phase: Phase,
}

impl<T> Rescan<T> {
    /// `target_page` and `limit` are both at least 1.
    pub fn new(target_page: usize, limit: usize) -> Self {
        debug_assert!(target_page >= 1 && limit >= 1);
        Self {
            target_page,
            limit,
            current_page: 1,
            offset: 0,
            buffer: Vec::new(),
            page_open: false,
            source_more: false,
            phase: Phase::Accumulating,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advances through every transition that needs no data and returns the
    /// next fetch, or `Complete` once the machine is terminal.
    pub fn poll(&mut self) -> Step {
        loop {
            if self.phase != Phase::Accumulating {
                return Step::Complete;
            }

            if !self.page_open {
                if self.current_page > self.target_page {
                    self.phase = Phase::Done;
                    continue;
                }

                if self.current_page > 1 {
                    // the previous page came up short, so the store is drained
                    if self.buffer.len() < self.limit {
                        self.exhaust();
                        continue;
                    }
                    self.buffer.drain(..self.limit);
                }
                self.page_open = true;
            }

            if self.buffer.len() < self.limit {
                return Step::Fetch {
                    offset: self.offset,
                    count: self.limit.saturating_add(1),
                };
            }

            self.close_page();
        }
    }

    /// Accepts the rows for the last `Step::Fetch`. `keep` maps a raw row to a
    /// buffered item, or drops it by returning `None`.
    pub fn feed<R, F>(&mut self, mut rows: Vec<R>, keep: F)
    where
        F: FnMut(R) -> Option<T>,
    {
        if self.phase != Phase::Accumulating || !self.page_open {
            return;
        }

        if rows.is_empty() {
            self.source_more = false;
            if self.current_page < self.target_page {
                self.exhaust();
            } else {
                self.close_page();
            }
            return;
        }

        self.source_more = rows.len() > self.limit;
        rows.truncate(self.limit);
        self.buffer.extend(rows.into_iter().filter_map(keep));

        // the cursor moves by raw rows, not by matches
        self.offset = self.offset.saturating_add(self.limit);
    }

    pub fn finish(mut self) -> ScanOutcome<T> {
        if self.buffer.is_empty() {
            return ScanOutcome {
                items: Vec::new(),
                has_next: false,
                has_prev: false,
            };
        }

        let has_next = self.buffer.len() > self.limit || self.source_more;
        self.buffer.truncate(self.limit);

        ScanOutcome {
            items: self.buffer,
            has_next,
            has_prev: self.target_page.saturating_sub(1).saturating_mul(self.limit) >= self.limit,
        }
    }

    fn close_page(&mut self) {
        self.current_page += 1;
        self.page_open = false;
    }

    fn exhaust(&mut self) {
        self.buffer.clear();
        self.source_more = false;
        self.phase = Phase::Exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives a scan over `rows`, keeping the ones `matches` accepts, and
    /// records every fetch the machine asked for.
    fn run<F>(rows: &[i32], page: usize, limit: usize, matches: F) -> (ScanOutcome<i32>, Vec<(usize, usize)>, Phase)
    where
        F: Fn(i32) -> bool,
    {
        let mut scan = Rescan::new(page, limit);
        let mut fetches = Vec::new();
        while let Step::Fetch { offset, count } = scan.poll() {
            fetches.push((offset, count));
            let chunk: Vec<i32> = rows.iter().skip(offset).take(count).copied().collect();
            scan.feed(chunk, |n| matches(n).then_some(n));
        }
        let phase = scan.phase();
        (scan.finish(), fetches, phase)
    }

    fn is_odd(n: i32) -> bool {
        n % 2 != 0
    }

    #[test]
    fn test_first_page_single_fetch() {
        let rows: Vec<i32> = (1..=10).collect();
        let (page, fetches, phase) = run(&rows, 1, 3, |_| true);

        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.has_next);
        assert!(!page.has_prev);
        assert_eq!(fetches, vec![(0, 4)]);
        assert_eq!(phase, Phase::Done);
    }

    #[test]
    fn test_sparse_matches_span_several_fetches() {
        // OK, NOK, NOK, OK, NOK, OK, OK, NOK  (odd = NOK here)
        let rows = [2, 1, 3, 4, 5, 6, 8, 7];
        let (page, fetches, _) = run(&rows, 1, 3, is_odd);

        assert_eq!(page.items, vec![1, 3, 5]);
        assert!(page.has_next);
        assert_eq!(fetches, vec![(0, 4), (3, 4)]);
    }

    #[test]
    fn test_second_page_skips_rows_consumed_by_first() {
        let rows = [2, 1, 3, 4, 5, 6, 8, 7];
        let (page, _, _) = run(&rows, 2, 3, is_odd);

        assert_eq!(page.items, vec![7]);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_overflow_is_carried_into_next_page() {
        // the second fetch of page 1 brings in 5 matches; 7 and 9 spill over
        let rows = [1, 3, 2, 5, 7, 9, 11, 4];
        let (first, fetches, _) = run(&rows, 1, 3, is_odd);
        assert_eq!(first.items, vec![1, 3, 5]);
        assert!(first.has_next);
        assert_eq!(fetches, vec![(0, 4), (3, 4)]);

        let (second, fetches, _) = run(&rows, 2, 3, is_odd);
        assert_eq!(second.items, vec![7, 9, 11]);
        assert!(!second.has_next);
        assert!(second.has_prev);
        assert_eq!(fetches, vec![(0, 4), (3, 4), (6, 4)]);
    }

    #[test]
    fn test_all_rows_match() {
        let rows: Vec<i32> = (0..5).collect();
        let (first, _, _) = run(&rows, 1, 2, |_| true);
        let (second, _, _) = run(&rows, 2, 2, |_| true);
        let (third, _, _) = run(&rows, 3, 2, |_| true);

        assert_eq!(first.items, vec![0, 1]);
        assert_eq!(second.items, vec![2, 3]);
        assert_eq!(third.items, vec![4]);
        assert!(first.has_next && second.has_next);
        assert!(!third.has_next);
        assert!(third.has_prev);
    }

    #[test]
    fn test_pages_partition_matches_without_gaps_or_repeats() {
        let rows: Vec<i32> = (0..37).collect();
        let expected: Vec<i32> = rows.iter().copied().filter(|n| n % 3 == 0).collect();

        let mut collected = Vec::new();
        let mut page_no = 1;
        loop {
            let (page, _, _) = run(&rows, page_no, 4, |n| n % 3 == 0);
            assert!(page.items.len() <= 4);
            collected.extend(page.items.iter().copied());
            if !page.has_next {
                break;
            }
            page_no += 1;
        }
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_page_past_end_is_exhausted_and_empty() {
        let rows: Vec<i32> = (1..=4).collect();
        let (page, _, phase) = run(&rows, 5, 3, |_| true);

        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_prev);
        assert_eq!(phase, Phase::Exhausted);
    }

    #[test]
    fn test_empty_source() {
        let (page, fetches, phase) = run(&[], 1, 5, |_| true);
        assert!(page.items.is_empty());
        assert!(!page.has_next && !page.has_prev);
        assert_eq!(fetches, vec![(0, 6)]);
        assert_eq!(phase, Phase::Done);
    }

    #[test]
    fn test_no_matches_at_all() {
        let rows = [2, 4, 6, 8, 10, 12, 14];
        let (page, fetches, _) = run(&rows, 1, 3, is_odd);

        assert!(page.items.is_empty());
        assert!(!page.has_next);
        // 0..3, 3..6, 6..7, then an empty fetch ends it
        assert_eq!(fetches, vec![(0, 4), (3, 4), (6, 4), (9, 4)]);
    }

    #[test]
    fn test_exact_fit_has_no_next() {
        let rows = [1, 3, 5];
        let (page, _, _) = run(&rows, 1, 3, is_odd);
        assert_eq!(page.items, vec![1, 3, 5]);
        assert!(!page.has_next);
    }

    #[test]
    fn test_lookahead_row_is_not_buffered() {
        // the 4th row matches but only serves as lookahead for the first fetch
        let rows = [2, 4, 6, 1];
        let mut scan = Rescan::new(1, 3);
        assert_eq!(scan.poll(), Step::Fetch { offset: 0, count: 4 });
        scan.feed(rows.to_vec(), |n: i32| is_odd(n).then_some(n));
        assert_eq!(scan.poll(), Step::Fetch { offset: 3, count: 4 });
        scan.feed(vec![1], |n: i32| is_odd(n).then_some(n));
        assert_eq!(scan.poll(), Step::Fetch { offset: 6, count: 4 });
        scan.feed(Vec::<i32>::new(), |n: i32| is_odd(n).then_some(n));
        assert_eq!(scan.poll(), Step::Complete);

        let page = scan.finish();
        assert_eq!(page.items, vec![1]);
        assert!(!page.has_next);
    }

    #[test]
    fn test_feed_after_complete_is_ignored() {
        let mut scan: Rescan<i32> = Rescan::new(1, 2);
        assert!(matches!(scan.poll(), Step::Fetch { .. }));
        scan.feed(vec![1, 2, 3], Some);
        assert_eq!(scan.poll(), Step::Complete);
        scan.feed(vec![9, 9, 9], Some);
        assert_eq!(scan.finish().items, vec![1, 2]);
    }

    #[test]
    fn test_huge_limit_saturates_cursor() {
        let (outcome, fetches, phase) = run(&[1, 3], 1, usize::MAX, is_odd);
        assert_eq!(outcome.items, vec![1, 3]);
        assert!(!outcome.has_next);
        assert!(!outcome.has_prev);
        assert_eq!(fetches, vec![(0, usize::MAX), (usize::MAX, usize::MAX)]);
        assert_eq!(phase, Phase::Done);
    }
}
