use nalgebra::Vector3;

/// A bounded map area described by a middle point and two corner points.
/// Bounds never change after construction; `update` is the hook for future
/// variants that do something per frame.
#[derive(Debug, Clone)]
pub struct Region {
    pub middle: Vector3<f32>,
    pub north_east: Vector3<f32>,
    pub south_west: Vector3<f32>,
}

impl Region {
    pub fn new(middle: Vector3<f32>, north_east: Vector3<f32>, south_west: Vector3<f32>) -> Self {
        Self { middle, north_east, south_west }
    }

    /// Uniform point inside the bounding box, edges included. Corner order
    /// does not matter, each axis is sorted before sampling.
    pub fn random_position(&self, rng: &mut fastrand::Rng) -> Vector3<f32> {
        Vector3::new(
            sample_axis(self.south_west.x, self.north_east.x, rng),
            sample_axis(self.south_west.y, self.north_east.y, rng),
            sample_axis(self.south_west.z, self.north_east.z, rng),
        )
    }

    pub fn update(&mut self) {}
}

fn sample_axis(a: f32, b: f32, rng: &mut fastrand::Rng) -> f32 {
    let (min, max) = if a <= b { (a, b) } else { (b, a) };
    min + rng.f32() * (max - min)
}

/// A region that owns the respawn schedule of the monsters spawned in it.
#[derive(Debug, Clone)]
pub struct RespawnerRegion {
    pub bounds: Region,
    respawn_time: u64,
}

impl RespawnerRegion {
    pub fn new(bounds: Region, respawn_time: u64) -> Self {
        Self { bounds, respawn_time }
    }

    /// Seconds between a monster despawning and coming back.
    pub fn respawn_time(&self) -> u64 {
        self.respawn_time
    }

    pub fn random_position(&self, rng: &mut fastrand::Rng) -> Vector3<f32> {
        self.bounds.random_position(rng)
    }

    pub fn update(&mut self) {
        self.bounds.update();
    }
}
