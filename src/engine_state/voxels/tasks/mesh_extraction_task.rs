//! Task for extracting the meshes of one tile in a background thread.
//!
//! The task polls the world's cancellation flag between its stages so that a reset
//! drains the pool quickly: whatever stage is running finishes, the rest is skipped
//! and nothing is delivered.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::trace;

use crate::engine_state::{
    meshing::{ExtractedMeshSet, IsQuadNeeded, IsWaterQuadNeeded, Mesh, RegionMesher},
    task_management::task::{Task, TaskOutcome},
    voxels::{coords::Region, delivery_queue::DeliverySender, paged_volume::PagedVolume},
};

/// Vertex capacity reserved per column of the tile for the opaque mesh.
const OPAQUE_FACTOR: usize = 16;
/// Vertex capacity reserved per column of the tile for the water mesh.
const WATER_FACTOR: usize = 16;
/// Upper bound of the up-front reservation; larger meshes grow on demand.
const MAX_RESERVED_VERTICES: usize = 1 << 20;

/// Vertices worth reserving for a mesh of `region`.
fn reserved_vertices(region: &Region, factor: usize) -> usize {
    let width = region.width_in_voxels().max(0) as usize;
    let depth = region.depth_in_voxels().max(0) as usize;
    width
        .saturating_mul(depth)
        .saturating_mul(factor)
        .min(MAX_RESERVED_VERTICES)
}

/// Extracts the opaque and water meshes of a single region.
///
/// This task is responsible for:
/// 1. Bailing out as soon as a reset is pending
/// 2. Running the opaque and the water pass of the mesher over the region
/// 3. Handing the finished pair to the delivery queue
pub struct MeshExtractionTask {
    volume: Arc<PagedVolume>,
    mesher: Arc<dyn RegionMesher>,
    region: Region,
    cancel: Arc<AtomicBool>,
    delivery: DeliverySender<ExtractedMeshSet>,
}

impl MeshExtractionTask {
    /// Creates a new mesh extraction task.
    ///
    /// # Arguments
    /// * `volume` - The volume to read voxels from
    /// * `mesher` - The extraction algorithm
    /// * `region` - The tile's full-height region
    /// * `cancel` - The world's reset flag, checked between stages
    /// * `delivery` - Where the finished meshes go
    pub fn new(
        volume: Arc<PagedVolume>,
        mesher: Arc<dyn RegionMesher>,
        region: Region,
        cancel: Arc<AtomicBool>,
        delivery: DeliverySender<ExtractedMeshSet>,
    ) -> Self {
        MeshExtractionTask {
            volume,
            mesher,
            region,
            cancel,
            delivery,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Task for MeshExtractionTask {
    fn process(self: Box<Self>) -> TaskOutcome {
        if self.cancelled() {
            return TaskOutcome::Abandoned;
        }

        let opaque_vertices = reserved_vertices(&self.region, OPAQUE_FACTOR);
        let water_vertices = reserved_vertices(&self.region, WATER_FACTOR);
        let mut opaque = Mesh::with_capacity(opaque_vertices, opaque_vertices * 6 / 4, self.region.mins);
        let mut water = Mesh::with_capacity(water_vertices, water_vertices * 6 / 4, self.region.mins);
        if self.cancelled() {
            return TaskOutcome::Abandoned;
        }

        self.mesher
            .extract(&self.volume, &self.region, &IsQuadNeeded, &mut opaque);
        if self.cancelled() {
            return TaskOutcome::Abandoned;
        }

        self.mesher
            .extract(&self.volume, &self.region, &IsWaterQuadNeeded, &mut water);
        if self.cancelled() {
            return TaskOutcome::Abandoned;
        }

        trace!(
            "extracted tile at {:?}: {} opaque faces, {} water faces",
            self.region.mins,
            opaque.num_faces(),
            water.num_faces()
        );
        if !self.delivery.push(ExtractedMeshSet { opaque, water }) {
            return TaskOutcome::Abandoned;
        }
        TaskOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        meshing::CubicMesher,
        voxels::{
            coords::MeshTileCoordinate,
            delivery_queue::DeliveryQueue,
            pager::FlatPager,
            voxel::voxel_type::VoxelType,
        },
    };
    use cgmath::Point3;

    fn setup() -> (Arc<PagedVolume>, DeliveryQueue<ExtractedMeshSet>, Region) {
        let volume = Arc::new(PagedVolume::new(
            Box::new(FlatPager::new(3, VoxelType::Rock)),
            1 << 20,
            16,
        ));
        let region = MeshTileCoordinate(Point3::new(16, 0, 0)).region(16, 32);
        (volume, DeliveryQueue::new(), region)
    }

    #[test]
    fn delivers_both_meshes_at_the_tile_origin() {
        let (volume, queue, region) = setup();
        let task = MeshExtractionTask::new(
            volume,
            Arc::new(CubicMesher),
            region,
            Arc::new(AtomicBool::new(false)),
            queue.sender(),
        );
        assert_eq!(Box::new(task).process(), TaskOutcome::Completed);

        let set = queue.pop().unwrap();
        assert_eq!(set.translation(), Point3::new(16, 0, 0));
        assert!(!set.opaque.is_empty());
        assert!(set.water.is_empty());
    }

    #[test]
    fn reservation_is_bounded_for_huge_tiles() {
        let tile = MeshTileCoordinate(Point3::new(0, 0, 0)).region(16, 32);
        assert_eq!(reserved_vertices(&tile, OPAQUE_FACTOR), 16 * 16 * OPAQUE_FACTOR);

        let huge = Region::new(Point3::new(0, 0, 0), Point3::new(60_000, 255, 60_000));
        assert_eq!(reserved_vertices(&huge, OPAQUE_FACTOR), MAX_RESERVED_VERTICES);
    }

    #[test]
    fn cancelled_task_delivers_nothing() {
        let (volume, queue, region) = setup();
        let task = MeshExtractionTask::new(
            volume,
            Arc::new(CubicMesher),
            region,
            Arc::new(AtomicBool::new(true)),
            queue.sender(),
        );
        assert_eq!(Box::new(task).process(), TaskOutcome::Abandoned);
        assert!(queue.pop().is_none());
    }
}
