//! # Voxel Raycasting
//!
//! Walks a line segment through the voxel grid one voxel at a time, visiting every
//! voxel the segment passes through (Amanatides & Woo, "A Fast Voxel Traversal
//! Algorithm for Ray Tracing").
//!
//! The walk is bounded by the voxel containing the segment's end point, so it always
//! terminates after at most `|dx| + |dy| + |dz|` steps, whatever the floating-point
//! error accumulated along the way.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{paged_volume::PagedVolume, voxel::Voxel};

/// How a raycast ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RaycastResult {
    /// The whole segment was traversed.
    Completed,
    /// The visitor stopped the walk; this is a hit.
    Interrupted,
}

impl RaycastResult {
    pub fn is_hit(self) -> bool {
        self == RaycastResult::Interrupted
    }
}

/// Outcome of [`pick_voxel`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PickResult {
    /// The first non-empty voxel along the ray.
    pub hit_voxel: Option<Point3<i32>>,
    /// The voxel visited just before the hit, where a new voxel would be placed.
    pub previous_voxel: Option<Point3<i32>>,
}

impl PickResult {
    pub fn did_hit(&self) -> bool {
        self.hit_voxel.is_some()
    }
}

fn floor(p: Point3<f32>) -> Point3<i32> {
    Point3::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
}

/// Visits every voxel between `start` and `end`, both included.
///
/// # Arguments
/// * `volume` - The volume to sample
/// * `start` - Segment start in world space
/// * `end` - Segment end in world space
/// * `visitor` - Called with each voxel in order; return `false` to stop
///
/// # Returns
/// [`RaycastResult::Interrupted`] if the visitor stopped the walk,
/// [`RaycastResult::Completed`] otherwise
pub fn raycast_with_endpoints<F>(
    volume: &PagedVolume,
    start: Point3<f32>,
    end: Point3<f32>,
    mut visitor: F,
) -> RaycastResult
where
    F: FnMut(Point3<i32>, Voxel) -> bool,
{
    let mut sampler = volume.sampler();
    let mut voxel = floor(start);
    let last = floor(end);
    let delta = end - start;

    let step = [delta.x, delta.y, delta.z].map(|d| if d > 0.0 { 1 } else { -1 });
    let t_delta = [delta.x, delta.y, delta.z].map(|d| {
        if d == 0.0 {
            f32::INFINITY
        } else {
            1.0 / d.abs()
        }
    });
    let mut t_max = [0usize, 1, 2].map(|axis| {
        let (origin, d, cell) = (start[axis], delta[axis], voxel[axis] as f32);
        if d > 0.0 {
            (cell + 1.0 - origin) / d
        } else if d < 0.0 {
            (origin - cell) / -d
        } else {
            f32::INFINITY
        }
    });

    loop {
        if !visitor(voxel, sampler.get_voxel(voxel)) {
            return RaycastResult::Interrupted;
        }
        if voxel == last {
            return RaycastResult::Completed;
        }

        // Only axes that still have distance to cover are candidates.
        let axis = (0..3)
            .filter(|&axis| voxel[axis] != last[axis])
            .min_by(|&a, &b| t_max[a].total_cmp(&t_max[b]))
            .unwrap_or(0);
        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];
    }
}

/// Casts a ray of length `max_distance` from `start` along `direction`.
///
/// `direction` does not need to be normalized. A zero direction or distance
/// visits just the start voxel.
pub fn raycast_with_direction<F>(
    volume: &PagedVolume,
    start: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    visitor: F,
) -> RaycastResult
where
    F: FnMut(Point3<i32>, Voxel) -> bool,
{
    let length = direction.magnitude();
    let end = if length > 0.0 && max_distance > 0.0 {
        start + direction * (max_distance / length)
    } else {
        start
    };
    raycast_with_endpoints(volume, start, end, visitor)
}

/// Finds the first voxel along `direction_and_length` that differs from `empty`.
pub fn pick_voxel(
    volume: &PagedVolume,
    start: Point3<f32>,
    direction_and_length: Vector3<f32>,
    empty: Voxel,
) -> PickResult {
    let mut result = PickResult::default();
    let mut previous = None;
    raycast_with_endpoints(volume, start, start + direction_and_length, |pos, voxel| {
        if voxel != empty {
            result.hit_voxel = Some(pos);
            result.previous_voxel = previous;
            return false;
        }
        previous = Some(pos);
        true
    });
    result
}
