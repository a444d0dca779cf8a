use crate::fish::{Fish, Motion};
use crate::food::{Food, FoodId};
use crate::math::Vec2;
use log::{debug, trace};
use rand::Rng;

// A chasing fish eats its food once inside this box on both axes.
pub(crate) const EAT_BOX: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Census {
    pub(crate) patrolling: usize,
    pub(crate) seeking: usize,
    pub(crate) realigning: usize,
}

/// Owns every fish and food pellet and decides who chases what.
pub(crate) struct Aquarium {
    width: f32,
    height: f32,
    fishes: Vec<Fish>,
    foods: Vec<Food>,
    next_food: u64,
    frames: u64,
    foods_eaten: u64,
    foods_expired: u64,
}

impl Aquarium {
    pub(crate) fn new(fishes: Vec<Fish>, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fishes,
            foods: Vec::new(),
            next_food: 1,
            frames: 0,
            foods_eaten: 0,
            foods_expired: 0,
        }
    }

    pub(crate) fn populate<R: Rng>(rng: &mut R, count: usize, width: f32, height: f32) -> Self {
        let fishes: Vec<Fish> = (0..count).map(|_| Fish::random(rng, width, height)).collect();
        for (ix, f) in fishes.iter().enumerate() {
            debug!(
                "fish {ix}: {} at ({:.0}, {:.0}) facing {:?}, speed {:.2}",
                f.species.name,
                f.pos.x,
                f.pos.y,
                f.facing(),
                f.speed
            );
        }
        Self::new(fishes, width, height)
    }

    pub(crate) fn width(&self) -> f32 {
        self.width
    }

    pub(crate) fn height(&self) -> f32 {
        self.height
    }

    pub(crate) fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub(crate) fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    pub(crate) fn foods_eaten(&self) -> u64 {
        self.foods_eaten
    }

    pub(crate) fn foods_expired(&self) -> u64 {
        self.foods_expired
    }

    pub(crate) fn census(&self) -> Census {
        let mut c = Census::default();
        for f in &self.fishes {
            match f.motion() {
                Motion::Patrolling => c.patrolling += 1,
                Motion::SeekingFood(_) => c.seeking += 1,
                Motion::Realigning => c.realigning += 1,
            }
        }
        c
    }

    /// Drop a pellet and point every fish that isn't already chasing at it.
    pub(crate) fn spawn_food_at(&mut self, x: f32, y: f32) -> FoodId {
        let id = FoodId(self.next_food);
        self.next_food += 1;
        self.foods.push(Food::new(id, Vec2::new(x, y)));

        let mut claimed = 0;
        for fish in self.fishes.iter_mut().filter(|f| !f.is_seeking()) {
            fish.chase(id);
            claimed += 1;
        }
        debug!("food {} dropped at ({x:.0}, {y:.0}), {claimed} fish chasing", id.0);
        id
    }

    /// One simulation frame: food sinks and ages, expired and eaten food is
    /// removed (releasing its chasers), then every other fish takes one step.
    pub(crate) fn advance_frame(&mut self) {
        self.frames += 1;

        for food in &mut self.foods {
            food.advance(self.height);
        }

        let mut expired = Vec::new();
        self.foods.retain(|f| {
            if f.expired() {
                expired.push(f.id);
                false
            } else {
                true
            }
        });
        // Fish released here sit out the rest of this frame.
        let mut fed = vec![false; self.fishes.len()];

        for id in expired {
            let released = self.release_chasers(id, &mut fed);
            self.foods_expired += 1;
            debug!("food {} expired, {released} fish released", id.0);
        }

        // At most one eater per pellet; the first chaser in the box wins.
        let mut eaten = Vec::new();
        for food in &self.foods {
            let eater = self.fishes.iter().position(|f| {
                f.target() == Some(food.id)
                    && (f.pos.x - food.pos.x).abs() < EAT_BOX
                    && (f.pos.y - food.pos.y).abs() < EAT_BOX
            });
            if let Some(ix) = eater {
                eaten.push((food.id, ix));
            }
        }
        for (id, ix) in eaten {
            self.foods.retain(|f| f.id != id);
            let released = self.release_chasers(id, &mut fed);
            self.foods_eaten += 1;
            debug!("food {} eaten by fish {ix}, {released} fish released", id.0);
        }

        let width = self.width;
        for (ix, fish) in self.fishes.iter_mut().enumerate() {
            if fed[ix] {
                continue;
            }
            let before = fish.motion();
            match before {
                Motion::Patrolling => fish.patrol(width),
                Motion::SeekingFood(id) => match self.foods.iter().find(|f| f.id == id) {
                    Some(food) => fish.follow(food.pos),
                    None => fish.release(),
                },
                Motion::Realigning => fish.realign(),
            }
            if fish.motion() != before {
                trace!("fish {ix}: {before:?} -> {:?}", fish.motion());
            }
        }
    }

    fn release_chasers(&mut self, id: FoodId, fed: &mut [bool]) -> usize {
        let mut n = 0;
        for (fish, fed) in self.fishes.iter_mut().zip(fed.iter_mut()) {
            if fish.target() == Some(id) {
                fish.release();
                *fed = true;
                n += 1;
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::{Facing, SPECIES};
    use rand::{rngs::StdRng, SeedableRng};

    fn fish_at(x: f32, y: f32) -> Fish {
        Fish::new(SPECIES[1], Vec2::new(x, y), Facing::Right, 3.0)
    }

    fn tank(fishes: Vec<Fish>) -> Aquarium {
        Aquarium::new(fishes, 800.0, 600.0)
    }

    fn food(aq: &Aquarium, id: FoodId) -> Option<&Food> {
        aq.foods().iter().find(|f| f.id == id)
    }

    fn assert_target_iff_seeking(aq: &Aquarium) {
        for f in aq.fishes() {
            assert_eq!(f.target().is_some(), f.is_seeking());
            if let Some(id) = f.target() {
                assert!(food(aq, id).is_some(), "fish holds a handle to removed food");
            }
        }
    }

    #[test]
    fn populate_starts_everyone_patrolling() {
        let mut rng = StdRng::seed_from_u64(5);
        let aq = Aquarium::populate(&mut rng, 15, 800.0, 600.0);
        assert_eq!(aq.fishes().len(), 15);
        assert_eq!(aq.census().patrolling, 15);
        assert!(aq.foods().is_empty());
    }

    #[test]
    fn one_food_claims_every_idle_fish() {
        let mut aq = tank((0..6).map(|i| fish_at(i as f32 * 50.0, 100.0)).collect());
        let id = aq.spawn_food_at(400.0, 300.0);
        assert_eq!(aq.census().seeking, 6);
        assert!(aq.fishes().iter().all(|f| f.target() == Some(id)));
        assert_target_iff_seeking(&aq);
    }

    #[test]
    fn newer_food_does_not_interrupt_a_chase() {
        let mut aq = tank(vec![fish_at(0.0, 100.0), fish_at(10.0, 100.0)]);
        let a = aq.spawn_food_at(400.0, 300.0);
        let b = aq.spawn_food_at(100.0, 100.0);
        assert_ne!(a, b);
        assert!(aq.fishes().iter().all(|f| f.target() == Some(a)));
        assert_eq!(aq.foods().len(), 2);
    }

    #[test]
    fn same_frame_spawns_assign_in_arrival_order() {
        let mut aq = tank(vec![fish_at(0.0, 100.0)]);
        let a = aq.spawn_food_at(700.0, 300.0);
        // Free a second fish by hand between the two clicks.
        aq.fishes.push(fish_at(0.0, 200.0));
        let b = aq.spawn_food_at(100.0, 100.0);
        assert_eq!(aq.fishes()[0].target(), Some(a));
        assert_eq!(aq.fishes()[1].target(), Some(b));
    }

    #[test]
    fn realigning_fish_are_claimed_too() {
        let mut aq = tank(vec![fish_at(0.0, 100.0)]);
        aq.fishes[0].heading = 45.0;
        aq.fishes[0].release();
        let id = aq.spawn_food_at(300.0, 300.0);
        assert_eq!(aq.fishes()[0].motion(), Motion::SeekingFood(id));
    }

    #[test]
    fn fish_next_to_food_eats_it() {
        let mut aq = tank(vec![fish_at(100.0, 100.0)]);
        aq.spawn_food_at(105.0, 103.0);
        aq.advance_frame();
        assert!(aq.foods().is_empty());
        assert_eq!(aq.fishes()[0].target(), None);
        assert_eq!(aq.fishes()[0].motion(), Motion::Realigning);
        assert_eq!(aq.foods_eaten(), 1);
    }

    #[test]
    fn eating_box_is_axis_aligned_and_strict() {
        // 9 units on both axes is ~12.7 Euclidean but still inside the box.
        let mut aq = tank(vec![fish_at(100.0, 100.0)]);
        aq.spawn_food_at(109.0, 107.0);
        aq.advance_frame();
        assert!(aq.foods().is_empty());

        // Exactly 10 on one axis is outside.
        let mut aq = tank(vec![fish_at(100.0, 100.0)]);
        let id = aq.spawn_food_at(110.0, 98.0);
        aq.advance_frame();
        assert!(food(&aq, id).is_some());
        assert!(aq.fishes()[0].is_seeking());
    }

    #[test]
    fn one_eater_releases_all_chasers() {
        let mut aq = tank(vec![fish_at(500.0, 500.0), fish_at(100.0, 100.0)]);
        aq.spawn_food_at(105.0, 100.0);
        aq.advance_frame();
        assert!(aq.foods().is_empty());
        assert_eq!(aq.census().realigning, 2);
        assert_target_iff_seeking(&aq);
    }

    #[test]
    fn two_fish_in_the_box_share_a_single_meal() {
        let mut aq = tank(vec![fish_at(100.0, 100.0), fish_at(103.0, 104.0)]);
        aq.spawn_food_at(105.0, 100.0);
        assert_eq!(aq.census().seeking, 2);

        aq.advance_frame();
        assert_eq!(aq.foods_eaten(), 1);
        assert_eq!(aq.foods_expired(), 0);
        assert!(aq.foods().is_empty());
        assert_eq!(aq.census().realigning, 2);
        assert_target_iff_seeking(&aq);

        aq.advance_frame();
        assert_eq!(aq.foods_eaten(), 1);
    }

    #[test]
    fn expired_food_releases_its_chasers() {
        let mut aq = tank(vec![fish_at(0.0, 100.0)]);
        let id = aq.spawn_food_at(700.0, 300.0);
        aq.foods[0].lifetime = 1;
        aq.advance_frame();
        assert!(food(&aq, id).is_none());
        assert_eq!(aq.fishes()[0].motion(), Motion::Realigning);
        assert_eq!(aq.foods_expired(), 1);
        assert_eq!(aq.foods_eaten(), 0);
    }

    #[test]
    fn food_without_chasers_just_expires() {
        let mut aq = tank(Vec::new());
        aq.spawn_food_at(10.0, 10.0);
        for _ in 0..499 {
            aq.advance_frame();
        }
        assert_eq!(aq.foods().len(), 1);
        aq.advance_frame();
        assert!(aq.foods().is_empty());
    }

    #[test]
    fn chasers_swim_toward_food_at_double_speed() {
        let mut aq = tank(vec![fish_at(100.0, 300.0)]);
        aq.spawn_food_at(400.0, 300.0);
        aq.advance_frame();
        let f = &aq.fishes()[0];
        assert!((f.pos.x - 106.0).abs() < 0.05);
        assert!(f.pos.y > 300.0);
        assert!(f.heading > 0.0 && f.heading < 5.0);
    }

    #[test]
    fn a_full_feeding_cycle_returns_to_patrol() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut aq = Aquarium::populate(&mut rng, 15, 800.0, 600.0);
        aq.spawn_food_at(400.0, 200.0);
        for _ in 0..2000 {
            aq.advance_frame();
            assert_target_iff_seeking(&aq);
        }
        assert!(aq.foods().is_empty());
        assert_eq!(aq.census().patrolling, 15);
        assert_eq!(aq.foods_eaten() + aq.foods_expired(), 1);
        assert_eq!(aq.frames(), 2000);
    }

    #[test]
    fn patrol_wrap_uses_tank_width() {
        let mut aq = Aquarium::new(vec![fish_at(799.0, 100.0)], 800.0, 600.0);
        aq.advance_frame();
        assert_eq!(aq.fishes()[0].pos.x, -SPECIES[1].width);
        assert_eq!(aq.width(), 800.0);
    }
}
