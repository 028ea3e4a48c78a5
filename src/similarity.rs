//! Sequence similarity ratio.
//!
//! Ratcliff/Obershelp style matching: find the longest common contiguous
//! block, then recurse into the pieces left and right of it. The ratio is
//! `2 * M / T` with `M` the total size of all matched blocks and `T` the
//! combined length of both strings, counted in `char`s.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `[0, 1]`.
///
/// Symmetric and reflexive: the greedy block search can depend on argument
/// order when several longest blocks tie, so both orders are scored and the
/// larger ratio is returned.
///
/// # Example
///
/// ```
/// use mealdedup::similarity::similarity;
///
/// assert_eq!(similarity("gulasch", "gulasch"), 1.0);
/// assert_eq!(similarity("abcd", "bcde"), 0.75);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let forward = ratio(&a, &b);
    let backward = ratio(&b, &a);
    forward.max(backward)
}

/// One-directional ratio.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = SequenceMatcher::new(a, b).matching_characters();
    2.0 * matches as f64 / total as f64
}

/// A matched block: `a[a_start..a_start + size] == b[b_start..b_start + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Greedy longest-match block finder over two char sequences.
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each char in `b`, ascending.
    b_index: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b_index.entry(*c).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    /// Longest block within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
    ///
    /// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a_start: a_lo,
            b_start: b_lo,
            size: 0,
        };

        // run_len[j] = length of the match ending at (i - 1, j)
        let mut run_len: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_run_len = HashMap::new();

            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }

                    let previous = if j > 0 {
                        run_len.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let k = previous + 1;
                    next_run_len.insert(j, k);

                    if k > best.size {
                        best = MatchBlock {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }

            run_len = next_run_len;
        }

        best
    }

    /// All matched blocks, found by recursive splitting around the longest one.
    fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }

            if a_lo < block.a_start && b_lo < block.b_start {
                pending.push((a_lo, block.a_start, b_lo, block.b_start));
            }

            let a_end = block.a_start + block.size;
            let b_end = block.b_start + block.size;
            if a_end < a_hi && b_end < b_hi {
                pending.push((a_end, a_hi, b_end, b_hi));
            }

            blocks.push(block);
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));
        blocks
    }

    fn matching_characters(&self) -> usize {
        self.matching_blocks().iter().map(|block| block.size).sum()
    }
}

/// Matched blocks between `a` and `b`, ordered by position.
pub fn matching_blocks(a: &str, b: &str) -> Vec<MatchBlock> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).matching_blocks()
}
