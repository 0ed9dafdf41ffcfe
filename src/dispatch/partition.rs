//! About the partitioning of the dump files over the worker ranks.
use std::ops::Range;
use mpi::topology::Rank;
use crate::common::error::DispatchError;





/// The two partitioning strategies observed across the analysis stages. Both
/// produce a perfect partition of the index range: every index belongs to
/// exactly one worker, and the share sizes differ by at most one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionPolicy
{
    /// Each worker owns one contiguous index block; the first `N mod P`
    /// workers carry the one-element remainder.
    ContiguousBlock,

    /// Worker `rank` owns every index `i` with `i mod P == rank`; used when
    /// the per-item work is independent and no locality matters.
    RoundRobin,
}

impl PartitionPolicy
{
    /// Compute the index share of one worker.
    ///
    /// # Parameters
    /// ```text
    /// n_items: the number of items to distribute (zero items is a valid, empty distribution)
    /// rank: the rank of this worker, in [0, n_workers)
    /// n_workers: the size of the worker group; fails with InvalidWorkerCount when no valid group is described
    /// ```
    pub fn share(&self, n_items: usize, rank: Rank, n_workers: Rank) -> Result<Vec<usize>, DispatchError>
    {
        if n_workers < 1 || rank < 0 || rank >= n_workers
        {
            return Err(DispatchError::InvalidWorkerCount);
        }

        let rank = rank as usize;
        let n_workers = n_workers as usize;
        match self
        {
            PartitionPolicy::ContiguousBlock => Ok(contiguous_block(n_items, rank, n_workers).collect()),
            PartitionPolicy::RoundRobin => Ok(round_robin(n_items, rank, n_workers).collect()),
        }
    }
}





/// The contiguous index range [start, end) owned by `rank`.
///
/// With `q = n_items div n_workers` and `r = n_items mod n_workers`, ranks
/// below `r` receive `q+1` items starting at `rank*(q+1)`, the remaining
/// ranks receive `q` items starting at `rank*q + r`.
///
/// `n_workers` must be at least 1; `PartitionPolicy::share` enforces this.
pub fn contiguous_block(n_items: usize, rank: usize, n_workers: usize) -> Range<usize>
{
    let quotient = n_items / n_workers;
    let remainder = n_items % n_workers;

    if rank < remainder
    {
        let start = rank * (quotient + 1);
        start..start + quotient + 1
    }
    else
    {
        let start = rank * quotient + remainder;
        start..start + quotient
    }
}



/// The indices owned by `rank` under round robin.
///
/// `n_workers` must be at least 1; `PartitionPolicy::share` enforces this.
pub fn round_robin(n_items: usize, rank: usize, n_workers: usize) -> impl Iterator<Item = usize>
{
    (rank..n_items).step_by(n_workers)
}





#[cfg(test)]
mod tests
{
    use super::*;

    fn shares(policy: PartitionPolicy, n_items: usize, n_workers: Rank) -> Vec<Vec<usize>>
    {
        (0..n_workers).map(|rank| policy.share(n_items, rank, n_workers).unwrap()).collect()
    }

    #[test]
    fn contiguous_blocks_cover_every_index_exactly_once()
    {
        for n_items in 0..40
        {
            for n_workers in 1..9
            {
                let shares = shares(PartitionPolicy::ContiguousBlock, n_items, n_workers);

                let union: Vec<usize> = shares.iter().flatten().copied().collect();
                assert_eq!(union, (0..n_items).collect::<Vec<usize>>(),
                    "gap or overlap for {n_items} items over {n_workers} workers");

                let largest = shares.iter().map(Vec::len).max().unwrap();
                let smallest = shares.iter().map(Vec::len).min().unwrap();
                assert!(largest - smallest <= 1,
                    "share skew {largest}-{smallest} for {n_items} items over {n_workers} workers");
            }
        }
    }

    #[test]
    fn seven_items_over_three_workers_split_as_documented()
    {
        assert_eq!(contiguous_block(7, 0, 3), 0..3);
        assert_eq!(contiguous_block(7, 1, 3), 3..5);
        assert_eq!(contiguous_block(7, 2, 3), 5..7);
    }

    #[test]
    fn fewer_items_than_workers_leaves_the_tail_ranks_empty()
    {
        let shares = shares(PartitionPolicy::ContiguousBlock, 2, 5);

        assert_eq!(shares, vec![vec![0], vec![1], vec![], vec![], vec![]]);
    }

    #[test]
    fn round_robin_assigns_each_index_to_its_residue_class()
    {
        for n_items in 0..40
        {
            for n_workers in 1..9
            {
                let shares = shares(PartitionPolicy::RoundRobin, n_items, n_workers);

                for (rank, share) in shares.iter().enumerate()
                {
                    assert!(share.iter().all(|&i| i % n_workers as usize == rank));
                }

                let mut union: Vec<usize> = shares.iter().flatten().copied().collect();
                union.sort_unstable();
                assert_eq!(union, (0..n_items).collect::<Vec<usize>>());
            }
        }
    }

    #[test]
    fn round_robin_with_as_many_workers_as_items_gives_each_its_own_rank()
    {
        for rank in 0..5
        {
            let share = PartitionPolicy::RoundRobin.share(5, rank, 5).unwrap();
            assert_eq!(share, vec![rank as usize]);
        }
    }

    #[test]
    fn zero_items_is_an_empty_share_not_an_error()
    {
        for policy in [PartitionPolicy::ContiguousBlock, PartitionPolicy::RoundRobin]
        {
            assert!(policy.share(0, 1, 3).unwrap().is_empty());
        }
    }

    #[test]
    fn an_empty_or_inconsistent_worker_group_is_rejected()
    {
        for policy in [PartitionPolicy::ContiguousBlock, PartitionPolicy::RoundRobin]
        {
            assert!(matches!(policy.share(10, 0, 0), Err(DispatchError::InvalidWorkerCount)));
            assert!(matches!(policy.share(10, -1, 4), Err(DispatchError::InvalidWorkerCount)));
            assert!(matches!(policy.share(10, 4, 4), Err(DispatchError::InvalidWorkerCount)));
        }
    }
}
