//! # A* Pathfinding
//!
//! Finds walkable routes between two voxels. Neighbours are the 26 voxels sharing a
//! face, edge or corner with the current one; step costs and the heuristic are both
//! euclidean, so the heuristic never overestimates and the returned path is optimal.
//!
//! The search is synchronous. Queries over large open areas can take a while, which is
//! what the iteration cap is for.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use cgmath::{MetricSpace, Point3, Vector3};
use log::trace;

use crate::error::PathError;

/// Offsets of all 26 neighbours of a voxel.
fn neighbour_offsets() -> impl Iterator<Item = Vector3<i32>> {
    (-1..=1).flat_map(|x| {
        (-1..=1).flat_map(move |y| (-1..=1).map(move |z| Vector3::new(x, y, z)))
    })
    .filter(|offset| *offset != Vector3::new(0, 0, 0))
}

fn distance(a: Point3<i32>, b: Point3<i32>) -> f32 {
    let a = Point3::new(a.x as f32, a.y as f32, a.z as f32);
    let b = Point3::new(b.x as f32, b.y as f32, b.z as f32);
    a.distance(b)
}

/// Entry of the open set, ordered so that `BinaryHeap` pops the lowest estimate first.
#[derive(Copy, Clone, Debug)]
struct OpenNode {
    estimate: f32,
    cost: f32,
    position: Point3<i32>,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties prefer the node closer to the goal.
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| self.cost.total_cmp(&other.cost))
    }
}

/// A* search over the voxel lattice.
///
/// `is_blocked` decides walkability; it is called at most once per examined voxel per
/// query, so it may sample a volume directly.
pub struct AStarPathfinder<F> {
    is_blocked: F,
    max_iterations: usize,
}

impl<F> AStarPathfinder<F>
where
    F: Fn(Point3<i32>) -> bool,
{
    pub fn new(is_blocked: F, max_iterations: usize) -> Self {
        AStarPathfinder {
            is_blocked,
            max_iterations,
        }
    }

    /// Searches for the cheapest path from `start` to `end`.
    ///
    /// # Returns
    /// Every voxel on the path in order, `start` and `end` included, or why no path
    /// was produced
    pub fn find_path(
        &self,
        start: Point3<i32>,
        end: Point3<i32>,
    ) -> Result<Vec<Point3<i32>>, PathError> {
        if (self.is_blocked)(start) {
            return Err(PathError::StartBlocked);
        }
        if (self.is_blocked)(end) {
            return Err(PathError::EndBlocked);
        }

        let mut open = BinaryHeap::new();
        let mut closed = HashSet::new();
        let mut best_cost: HashMap<Point3<i32>, f32> = HashMap::new();
        let mut came_from: HashMap<Point3<i32>, Point3<i32>> = HashMap::new();
        let mut blocked_cache: HashMap<Point3<i32>, bool> = HashMap::new();

        best_cost.insert(start, 0.0);
        open.push(OpenNode {
            estimate: distance(start, end),
            cost: 0.0,
            position: start,
        });

        let mut iterations = 0;
        while let Some(current) = open.pop() {
            if current.position == end {
                trace!("path found after {} expansions", iterations);
                return Ok(Self::reconstruct(&came_from, end));
            }
            if !closed.insert(current.position) {
                continue;
            }

            iterations += 1;
            if iterations > self.max_iterations {
                return Err(PathError::IterationCapExceeded {
                    cap: self.max_iterations,
                });
            }

            for offset in neighbour_offsets() {
                let neighbour = current.position + offset;
                if closed.contains(&neighbour) {
                    continue;
                }
                let blocked = *blocked_cache
                    .entry(neighbour)
                    .or_insert_with(|| (self.is_blocked)(neighbour));
                if blocked {
                    continue;
                }

                let cost = current.cost + distance(current.position, neighbour);
                if best_cost.get(&neighbour).is_some_and(|&known| known <= cost) {
                    continue;
                }
                best_cost.insert(neighbour, cost);
                came_from.insert(neighbour, current.position);
                open.push(OpenNode {
                    estimate: cost + distance(neighbour, end),
                    cost,
                    position: neighbour,
                });
            }
        }

        Err(PathError::NoPath)
    }

    fn reconstruct(
        came_from: &HashMap<Point3<i32>, Point3<i32>>,
        end: Point3<i32>,
    ) -> Vec<Point3<i32>> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(&previous) = came_from.get(&current) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}
