//! Sprite frame bookkeeping
//!
//! The renderer owns the textures; the simulation only decides which frame of
//! which clip each animated entity shows.

use serde::{Deserialize, Serialize};

use super::world::{Facet, World};

/// Frames per clip in the sprite atlas
pub const CLIP_FRAMES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clip {
    MouseIdle,
    MouseNorth,
    MouseEast,
    MouseSouth,
    MouseWest,
    CatEast,
    CatWest,
    Explosion,
}

impl Clip {
    /// Atlas index of the clip's first frame
    pub fn first_frame(self) -> u32 {
        let slot = match self {
            Clip::MouseIdle => 0,
            Clip::MouseNorth => 1,
            Clip::MouseEast => 2,
            Clip::MouseSouth => 3,
            Clip::MouseWest => 4,
            Clip::CatEast => 5,
            Clip::CatWest => 6,
            Clip::Explosion => 7,
        };
        slot * CLIP_FRAMES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub clip: Clip,
    /// Frame within the clip
    pub frame: u32,
    pub loops: bool,
    /// Time spent on the current frame
    pub elapsed_ms: f32,
    /// Non-looping clip ran past its last frame
    pub finished: bool,
}

impl Animation {
    pub fn looping(clip: Clip) -> Self {
        Self {
            clip,
            frame: 0,
            loops: true,
            elapsed_ms: 0.0,
            finished: false,
        }
    }

    pub fn once(clip: Clip) -> Self {
        Self {
            loops: false,
            ..Self::looping(clip)
        }
    }

    /// Atlas index to draw
    pub fn current_frame(&self) -> u32 {
        self.clip.first_frame() + self.frame.min(CLIP_FRAMES - 1)
    }

    /// Switch clips, restarting only when the clip actually changes
    pub fn set_clip(&mut self, clip: Clip) {
        if self.clip != clip {
            self.clip = clip;
            self.frame = 0;
        }
    }

    /// Advance by `elapsed_ms`; steps at most one frame per call
    pub fn advance(&mut self, elapsed_ms: f32, frame_duration_ms: f32) {
        if self.finished {
            return;
        }
        self.elapsed_ms += elapsed_ms;
        if self.elapsed_ms <= frame_duration_ms {
            return;
        }
        self.elapsed_ms = 0.0;
        self.frame += 1;
        if self.frame >= CLIP_FRAMES {
            if self.loops {
                self.frame = 0;
            } else {
                self.frame = CLIP_FRAMES - 1;
                self.finished = true;
            }
        }
    }
}

/// Point cats at their direction of travel (horizontal only)
pub fn face_cats(world: &mut World) {
    for (_, entity) in world.iter_mut() {
        if !entity.cat {
            continue;
        }
        let velocity = entity.motion.velocity;
        let Some(animation) = entity.animation.as_mut() else {
            continue;
        };
        if velocity.x.abs() > velocity.y.abs() {
            animation.set_clip(if velocity.x > 0.0 {
                Clip::CatEast
            } else {
                Clip::CatWest
            });
        }
    }
}

/// Advance every animation. While the player is dead only explosions keep playing.
/// Explosions that already finished are removed.
pub fn advance_animations(world: &mut World, elapsed_ms: f32, frame_duration_ms: f32, dead: bool) {
    for id in world.ids_with(Facet::Animation) {
        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        let explosion = entity.explosion;
        let Some(animation) = entity.animation.as_mut() else {
            continue;
        };

        if explosion && animation.finished {
            world.despawn(id);
            continue;
        }
        if dead && !explosion {
            continue;
        }
        animation.advance(elapsed_ms, frame_duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Entity;
    use glam::Vec2;

    #[test]
    fn test_looping_wraps() {
        let mut anim = Animation::looping(Clip::MouseEast);
        for _ in 0..3 {
            anim.advance(250.0, 200.0);
        }
        assert_eq!(anim.frame, 0);
        assert_eq!(anim.current_frame(), Clip::MouseEast.first_frame());
        assert!(!anim.finished);
    }

    #[test]
    fn test_short_ticks_accumulate() {
        let mut anim = Animation::looping(Clip::CatWest);
        anim.advance(120.0, 200.0);
        assert_eq!(anim.frame, 0);
        anim.advance(120.0, 200.0);
        assert_eq!(anim.frame, 1);
    }

    #[test]
    fn test_set_clip_same_keeps_frame() {
        let mut anim = Animation::looping(Clip::MouseNorth);
        anim.advance(300.0, 200.0);
        anim.set_clip(Clip::MouseNorth);
        assert_eq!(anim.frame, 1);
        anim.set_clip(Clip::MouseSouth);
        assert_eq!(anim.frame, 0);
    }

    #[test]
    fn test_explosion_removed_after_last_frame() {
        let mut world = World::default();
        let boom = world.spawn(Entity {
            explosion: true,
            animation: Some(Animation::once(Clip::Explosion)),
            ..Default::default()
        });
        // Three frame steps to run past the end, one more pass to clean up
        for _ in 0..3 {
            advance_animations(&mut world, 250.0, 200.0, false);
            assert!(world.contains(boom));
        }
        advance_animations(&mut world, 250.0, 200.0, false);
        assert!(!world.contains(boom));
    }

    #[test]
    fn test_dead_freezes_everything_but_explosions() {
        let mut world = World::default();
        let cat = world.spawn(Entity {
            cat: true,
            animation: Some(Animation::looping(Clip::CatEast)),
            ..Default::default()
        });
        let boom = world.spawn(Entity {
            explosion: true,
            animation: Some(Animation::once(Clip::Explosion)),
            ..Default::default()
        });
        advance_animations(&mut world, 250.0, 200.0, true);
        assert_eq!(world.get(cat).and_then(|e| e.animation).map(|a| a.frame), Some(0));
        assert_eq!(world.get(boom).and_then(|e| e.animation).map(|a| a.frame), Some(1));
    }

    #[test]
    fn test_cats_face_travel() {
        let mut world = World::default();
        let cat = world.spawn(Entity {
            cat: true,
            motion: crate::sim::world::Motion {
                velocity: Vec2::new(50.0, 10.0),
                ..Default::default()
            },
            animation: Some(Animation::looping(Clip::CatWest)),
            ..Default::default()
        });
        face_cats(&mut world);
        assert_eq!(world.get(cat).and_then(|e| e.animation).map(|a| a.clip), Some(Clip::CatEast));
    }
}
