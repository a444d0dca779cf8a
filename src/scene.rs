use crate::math::Vec2;
use rand::Rng;
use std::f32::consts::PI;

const SEGMENTS: usize = 7;
const SEGMENT_STEP: f32 = 12.0;
const SWAY: f32 = 5.0;

/// Decorative seaweed rooted on the tank floor. Purely visual.
#[derive(Clone, Debug)]
pub(crate) struct Seaweed {
    pub(crate) x: f32,
    pub(crate) wave_offset: f32,
    pub(crate) wave_speed: f32,
}

impl Seaweed {
    pub(crate) fn random<R: Rng>(rng: &mut R, tank_w: f32) -> Self {
        let hi = (tank_w - 20.0).max(20.0);
        Self {
            x: rng.gen_range(20.0..=hi),
            wave_offset: rng.gen_range(0.0..2.0 * PI),
            wave_speed: rng.gen_range(0.02..0.05),
        }
    }

    pub(crate) fn sway(&self, ticks_ms: u64) -> f32 {
        (ticks_ms as f32 * self.wave_speed + self.wave_offset).sin() * SWAY
    }

    /// Stacked stalk segments for this frame, with a little random jitter at each tip.
    pub(crate) fn segments<R: Rng>(&self, ticks_ms: u64, tank_h: f32, rng: &mut R) -> Vec<(Vec2, Vec2)> {
        let o = self.sway(ticks_ms);
        (0..SEGMENTS)
            .map(|i| {
                let i = i as f32;
                let jitter = rng.gen_range(-5i32..=5) as f32;
                (
                    Vec2::new(self.x + o, tank_h - 10.0 - i * SEGMENT_STEP),
                    Vec2::new(self.x + o + jitter, tank_h - i * SEGMENT_STEP - 20.0),
                )
            })
            .collect()
    }
}

pub(crate) fn plant_bed<R: Rng>(rng: &mut R, count: usize, tank_w: f32) -> Vec<Seaweed> {
    (0..count).map(|_| Seaweed::random(rng, tank_w)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn plants_root_inside_the_tank() {
        let mut rng = StdRng::seed_from_u64(9);
        for p in plant_bed(&mut rng, 50, 800.0) {
            assert!(p.x >= 20.0 && p.x <= 780.0);
            assert!(p.wave_speed >= 0.02 && p.wave_speed < 0.05);
        }
    }

    #[test]
    fn segments_stack_from_the_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = Seaweed {
            x: 100.0,
            wave_offset: 0.0,
            wave_speed: 0.03,
        };
        let segs = p.segments(0, 600.0, &mut rng);
        assert_eq!(segs.len(), 7);
        assert_eq!(segs[0].0, Vec2::new(100.0, 590.0));
        assert_eq!(segs[6].0.y, 590.0 - 72.0);
        for (a, b) in &segs {
            assert_eq!(b.y, a.y - 10.0);
            assert!((b.x - a.x).abs() <= 5.0);
        }
    }

    #[test]
    fn sway_is_bounded() {
        let p = Seaweed {
            x: 0.0,
            wave_offset: 1.0,
            wave_speed: 0.04,
        };
        for t in (0..10_000).step_by(37) {
            assert!(p.sway(t).abs() <= 5.0 + 1e-4);
        }
    }
}
