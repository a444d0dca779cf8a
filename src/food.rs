use crate::math::Vec2;

pub(crate) const FOOD_SIZE: f32 = 5.0;
pub(crate) const SINK_SPEED: f32 = 2.0;
pub(crate) const FOOD_LIFETIME: i32 = 500;
// Food stops sinking this far above the bottom of the tank.
pub(crate) const FLOOR_MARGIN: f32 = 10.0;

/// Non-owning handle to a food pellet. Ids are never reused within a run,
/// so a stale handle simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FoodId(pub(crate) u64);

#[derive(Clone, Debug)]
pub(crate) struct Food {
    pub(crate) id: FoodId,
    pub(crate) pos: Vec2,
    pub(crate) size: f32,
    pub(crate) lifetime: i32,
}

impl Food {
    pub(crate) fn new(id: FoodId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: FOOD_SIZE,
            lifetime: FOOD_LIFETIME,
        }
    }

    /// Sink one step (until the floor) and burn one frame of lifetime.
    pub(crate) fn advance(&mut self, tank_height: f32) {
        if self.pos.y < tank_height - FLOOR_MARGIN {
            self.pos.y += SINK_SPEED;
        }
        self.lifetime -= 1;
    }

    pub(crate) fn expired(&self) -> bool {
        self.lifetime <= 0
    }
}
