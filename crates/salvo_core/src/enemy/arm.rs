//! Articulated arm carried by the melee archetype.
//!
//! Two links hang off the enemy body, the second attached to the tip of
//! the first, with a spinning saw at the end of the chain. The first link
//! always turns toward the enemy's target. The second link swings like a
//! pendulum until the enemy engages, then tracks the target as well. The
//! saw is a hazard of its own and is tested against the player separately
//! from the enemy body.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::Body;
use crate::config::ArmTuning;
use crate::math::{angle_between, bearing};
use crate::render::{AssetTable, RenderItem, Renderable, Sprite};

/// Pendulum state of a swinging link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Swing {
    angle: f32,
    clockwise: bool,
}

/// The spinning blade at the end of the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saw {
    /// Transform, hitbox and weight.
    pub body: Body,
    /// Contact damage dealt to the player.
    pub damage: f32,
}

/// Two links and a saw, owned by one melee enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmChain {
    upper: Body,
    lower: Body,
    swing: Swing,
    /// Blade at the tip of the lower link.
    pub saw: Saw,
}

impl ArmChain {
    /// Build a chain folded onto `anchor`.
    #[must_use]
    pub fn new(anchor: &Body, tuning: &ArmTuning, assets: &AssetTable) -> Self {
        let link = |rotation: f32| {
            Body::new(anchor.position)
                .with_scale(tuning.link_length)
                .with_rotation(rotation)
                .with_asset(assets.handle(Sprite::Arm))
        };
        let saw_body = Body::new(anchor.position)
            .with_scale(tuning.saw_scale)
            .with_hitbox(tuning.saw_scale / 2.0)
            .with_weight(tuning.saw_weight)
            .with_asset(assets.handle(Sprite::Saw));

        let mut chain = Self {
            upper: link(anchor.rotation()),
            lower: link(anchor.rotation()),
            swing: Swing {
                angle: 0.0,
                clockwise: true,
            },
            saw: Saw {
                body: saw_body,
                damage: tuning.saw_damage,
            },
        };
        chain.attach(anchor, tuning);
        chain
    }

    /// Upper link transform.
    #[must_use]
    pub const fn upper(&self) -> &Body {
        &self.upper
    }

    /// Lower link transform.
    #[must_use]
    pub const fn lower(&self) -> &Body {
        &self.lower
    }

    /// Advance the chain by one tick.
    ///
    /// `tracking` is true while the enemy engages the player; the lower
    /// link then stops swinging and turns toward `target` too.
    pub fn update(&mut self, anchor: &Body, target: Vec3, tracking: bool, dt: f32, tuning: &ArmTuning) {
        let step = tuning.turn_speed * dt;
        self.attach(anchor, tuning);
        turn_toward(&mut self.upper, target, step);
        self.attach(anchor, tuning);

        if tracking {
            turn_toward(&mut self.lower, target, step);
        } else {
            let swing = &mut self.swing;
            if swing.clockwise {
                swing.angle -= step;
                if swing.angle < -tuning.max_swing {
                    swing.angle = -tuning.max_swing;
                    swing.clockwise = false;
                }
            } else {
                swing.angle += step;
                if swing.angle > tuning.max_swing {
                    swing.angle = tuning.max_swing;
                    swing.clockwise = true;
                }
            }
            self.lower.set_rotation(self.swing.angle + self.upper.rotation());
        }
        self.attach(anchor, tuning);

        let spin = self.saw.body.rotation() + tuning.saw_spin * dt;
        self.saw.body.set_rotation(spin);
    }

    /// Re-seat the links and saw on the anchor without turning anything.
    fn attach(&mut self, anchor: &Body, tuning: &ArmTuning) {
        let half = tuning.link_length / 2.0;
        self.upper.position = anchor.position + self.upper.bearing() * half;
        let elbow = self.upper.position + self.upper.bearing() * half;
        self.lower.position = elbow + self.lower.bearing() * half;
        self.saw.body.position = self.lower.position + self.lower.bearing() * half;
    }
}

/// Rotate a body toward a point by at most `step` radians.
pub(crate) fn turn_toward(body: &mut Body, target: Vec3, step: f32) {
    let to_target = (target - body.position).truncate();
    let difference = angle_between(bearing(body.rotation()).truncate(), to_target);
    if difference < 0.0 {
        body.set_rotation(body.rotation() + difference.max(-step));
    } else if difference > 0.0 {
        body.set_rotation(body.rotation() + difference.min(step));
    }
}

impl Renderable for ArmChain {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem::sprite(&self.upper));
        out.push(RenderItem::sprite(&self.lower));
        out.push(RenderItem::sprite(&self.saw.body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn anchor() -> Body {
        Body::new(Vec3::ZERO).with_rotation(0.0)
    }

    #[test]
    fn test_chain_extends_along_facing() {
        let chain = ArmChain::new(&anchor(), &ArmTuning::default(), &AssetTable::default());
        assert!((chain.upper().position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
        assert!((chain.lower().position - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-5);
        assert!((chain.saw.body.position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(chain.saw.body.hitbox, 1.0);
    }

    #[test]
    fn test_swing_is_bounded_and_reverses() {
        let tuning = ArmTuning::default();
        let mut chain = ArmChain::new(&anchor(), &tuning, &AssetTable::default());
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut saw_clockwise = false;
        let mut saw_counter = false;
        let mut last = chain.swing.angle;
        for _ in 0..400 {
            chain.update(&anchor(), target, false, 0.05, &tuning);
            assert!(chain.swing.angle.abs() <= tuning.max_swing + 1e-5);
            if chain.swing.angle < last {
                saw_clockwise = true;
            }
            if chain.swing.angle > last {
                saw_counter = true;
            }
            last = chain.swing.angle;
        }
        assert!(saw_clockwise && saw_counter);
    }

    #[test]
    fn test_tracking_turns_both_links() {
        let tuning = ArmTuning::default();
        let mut chain = ArmChain::new(&anchor(), &tuning, &AssetTable::default());
        let target = Vec3::new(0.0, 20.0, 0.0);
        for _ in 0..200 {
            chain.update(&anchor(), target, true, 0.05, &tuning);
        }
        assert!((chain.upper().rotation() - PI / 2.0).abs() < 0.1);
        assert!((chain.lower().rotation() - PI / 2.0).abs() < 0.1);
    }

    #[test]
    fn test_saw_spins() {
        let tuning = ArmTuning::default();
        let mut chain = ArmChain::new(&anchor(), &tuning, &AssetTable::default());
        chain.update(&anchor(), Vec3::X, false, 0.25, &tuning);
        assert!((chain.saw.body.rotation() - PI / 2.0).abs() < 1e-4);
    }
}
