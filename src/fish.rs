use crate::food::FoodId;
use crate::math::Vec2;
use crate::render::Rgb;
use rand::Rng;

// A chasing fish keeps going while at least this far (Euclidean) from its food.
// Inclusive: a fish exactly this far out still takes another step.
pub(crate) const ARRIVE_DISTANCE: f32 = 5.0;
pub(crate) const CHASE_SPEED_FACTOR: f32 = 2.0;
pub(crate) const REALIGN_RATE: f32 = 0.1;
pub(crate) const REALIGN_SNAP_DEG: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Facing {
    Right,
    Left,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Heading a cruising fish holds, in degrees.
    pub(crate) fn cruise_angle(self) -> f32 {
        match self {
            Facing::Right => 0.0,
            Facing::Left => 180.0,
        }
    }
}

/// What a fish is doing this frame. The food handle only exists while chasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Motion {
    Patrolling,
    SeekingFood(FoodId),
    Realigning,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Species {
    pub(crate) name: &'static str,
    pub(crate) color: Rgb,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

pub(crate) const SPECIES: [Species; 5] = [
    Species {
        name: "orange",
        color: Rgb::new(255, 165, 0),
        width: 70.0,
        height: 35.0,
    },
    Species {
        name: "green",
        color: Rgb::new(0, 255, 127),
        width: 60.0,
        height: 30.0,
    },
    Species {
        name: "red",
        color: Rgb::new(255, 0, 0),
        width: 75.0,
        height: 38.0,
    },
    Species {
        name: "blue",
        color: Rgb::new(0, 191, 255),
        width: 65.0,
        height: 33.0,
    },
    Species {
        name: "yellow",
        color: Rgb::new(255, 255, 0),
        width: 68.0,
        height: 34.0,
    },
];

#[derive(Clone, Debug)]
pub(crate) struct Fish {
    pub(crate) pos: Vec2,
    pub(crate) heading: f32,
    facing: Facing,
    pub(crate) speed: f32,
    pub(crate) species: Species,
    motion: Motion,
}

impl Fish {
    pub(crate) fn new(species: Species, pos: Vec2, facing: Facing, speed: f32) -> Self {
        Self {
            pos,
            heading: facing.cruise_angle(),
            facing,
            speed,
            species,
            motion: Motion::Patrolling,
        }
    }

    /// A fish entering from the edge it faces away from.
    pub(crate) fn random<R: Rng>(rng: &mut R, tank_w: f32, tank_h: f32) -> Self {
        let species = SPECIES[rng.gen_range(0..SPECIES.len())];
        let top = 50i32;
        let bottom = ((tank_h as i32) - 100).max(top);
        let y = rng.gen_range(top..=bottom) as f32;
        let speed = rng.gen_range(2.0f32..4.0);
        let (x, facing) = if rng.gen_bool(0.5) {
            (-species.width, Facing::Right)
        } else {
            (tank_w, Facing::Left)
        };
        Self::new(species, Vec2::new(x, y), facing, speed)
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn motion(&self) -> Motion {
        self.motion
    }

    pub(crate) fn target(&self) -> Option<FoodId> {
        match self.motion {
            Motion::SeekingFood(id) => Some(id),
            _ => None,
        }
    }

    pub(crate) fn is_seeking(&self) -> bool {
        matches!(self.motion, Motion::SeekingFood(_))
    }

    pub(crate) fn chase(&mut self, food: FoodId) {
        self.motion = Motion::SeekingFood(food);
    }

    /// Drop any target and start turning back to the cruising heading.
    pub(crate) fn release(&mut self) {
        self.motion = Motion::Realigning;
    }

    /// Cruise horizontally, teleporting to the far edge once fully off screen.
    pub(crate) fn patrol(&mut self, tank_w: f32) {
        self.pos.x += self.speed * self.facing.sign();

        match self.facing {
            Facing::Right if self.pos.x > tank_w => self.pos.x = -self.species.width,
            Facing::Left if self.pos.x < -self.species.width => self.pos.x = tank_w,
            _ => {}
        }
    }

    /// Steer straight at `target` at double speed; on arrival switch to realigning.
    pub(crate) fn follow(&mut self, target: Vec2) {
        let to = target - self.pos;
        if to.len() >= ARRIVE_DISTANCE {
            self.heading = to.heading_deg();
            self.pos += Vec2::from_heading_deg(self.heading) * (self.speed * CHASE_SPEED_FACTOR);
        } else {
            self.release();
        }
    }

    /// Ease the heading back to the cruising angle. Position is untouched.
    pub(crate) fn realign(&mut self) {
        let target = self.facing.cruise_angle();
        if (self.heading - target).abs() > REALIGN_SNAP_DEG {
            self.heading += (target - self.heading) * REALIGN_RATE;
        } else {
            self.heading = target;
            self.motion = Motion::Patrolling;
        }
    }
}
