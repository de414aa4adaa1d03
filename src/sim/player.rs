//! Player input handling
//!
//! Held directions accelerate the mouse per axis; ice cuts the acceleration so
//! it keeps sliding. The cursor aims both the indicator and portal shots.

use glam::Vec2;

use super::animation::Clip;
use super::spawn;
use super::state::{GameEvent, GameState};
use super::tick::TickInput;
use super::world::{EntityId, World, step_out};
use crate::settings::Settings;

/// Accelerate toward the held direction, or bleed speed off when the axis is
/// idle (nothing held, or both opposing keys held)
fn axis_velocity(velocity: f32, negative: bool, positive: bool, accel: f32, max: f32) -> f32 {
    match (negative, positive) {
        (true, false) => (velocity - accel).max(-max),
        (false, true) => (velocity + accel).min(max),
        _ if velocity > 0.0 => (velocity - accel).max(0.0),
        _ => (velocity + accel).min(0.0),
    }
}

fn movement_clip(input: &TickInput) -> Clip {
    if input.left {
        Clip::MouseWest
    } else if input.right {
        Clip::MouseEast
    } else if input.up {
        Clip::MouseNorth
    } else if input.down {
        Clip::MouseSouth
    } else {
        Clip::MouseIdle
    }
}

/// Apply held directions to the player's velocity and pick its clip
pub fn move_player(world: &mut World, player: EntityId, input: &TickInput, elapsed_ms: f32, settings: &Settings) {
    let Some(entity) = world.get_mut(player) else {
        return;
    };
    let on_ice = entity.player.is_some_and(|p| p.on_ice);
    let accel = if on_ice { settings.ice_accel } else { settings.player_accel } * elapsed_ms;
    let max = settings.player_max_speed;

    let v = entity.motion.velocity;
    entity.motion.velocity = Vec2::new(
        axis_velocity(v.x, input.left, input.right, accel, max),
        axis_velocity(v.y, input.up, input.down, accel, max),
    );

    if let Some(animation) = entity.animation.as_mut() {
        animation.set_clip(movement_clip(input));
    }
}

/// Unit aim direction from the player toward the cursor (zero when on top of it)
fn aim(from: Vec2, cursor: Vec2) -> Vec2 {
    (cursor - from).normalize_or_zero()
}

/// Park the indicator a fixed distance from the player, pointing at the cursor
pub fn place_indicator(world: &mut World, player: EntityId, indicator: EntityId, cursor: Vec2, spacing: f32) {
    let Some(origin) = world.motion(player).map(|m| m.position) else {
        return;
    };
    let dir = aim(origin, cursor);
    if let Some(motion) = world.motion_mut(indicator) {
        motion.position = origin + dir * spacing;
        motion.angle = 90.0 + dir.y.atan2(dir.x).to_degrees();
    }
}

/// Shoot a portal projectile at the cursor. Does nothing without charge.
pub fn fire_portal(state: &mut GameState, cursor: Vec2) -> Option<EntityId> {
    if state.portal_charge == 0 || state.is_dead() {
        return None;
    }
    let origin = state.player.and_then(|p| state.world.motion(p)).map(|m| m.position)?;
    let velocity = aim(origin, cursor) * state.settings.portal_bullet_speed;
    let shot = spawn::portal_bullet(&mut state.world, origin, state.settings.portal_bullet_size, velocity);
    state.events.push(GameEvent::PortalShot);
    Some(shot)
}

/// Step out of the partner of the portal the player stood next to last tick
pub fn teleport(state: &mut GameState) -> bool {
    let Some(near) = state.proximity else {
        return false;
    };
    if state.player != Some(near.player) {
        return false;
    }
    let exit = state
        .world
        .paired_portal(near.portal)
        .and_then(|partner| state.world.get(partner))
        .and_then(|e| Some((e.motion.position, e.portal?.direction)));
    let Some((partner_pos, facing)) = exit else {
        log::warn!("Teleport requested at a portal with no live partner");
        return false;
    };

    let to = step_out(partner_pos, facing);
    let Some(motion) = state.world.motion_mut(near.player) else {
        return false;
    };
    motion.position = to;
    state.proximity = None;
    log::debug!("Teleported to {to}");
    state.events.push(GameEvent::Teleported { to });
    true
}

/// Close every portal; spent charge stays spent
pub fn clear_portals(state: &mut GameState) {
    let removed = state.world.clear_portals();
    state.opening_portal = None;
    state.proximity = None;
    if removed > 0 {
        log::debug!("Cleared {removed} portal(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use crate::consts::CELL_SIZE;
    use crate::sim::collision::PortalProximity;
    use crate::sim::grid::GridPos;
    use crate::sim::level::LevelLayout;
    use crate::sim::world::{Facet, ProjectileKind};

    fn state(charges: u32) -> GameState {
        let rows = [
            "##########",
            "#........#",
            "#...P....#",
            "#........#",
            "##########",
        ];
        let layout = LevelLayout::from_ascii("open", charges, &rows).unwrap();
        GameState::new(vec![layout], Settings::default(), 1).unwrap()
    }

    #[test]
    fn test_axis_acceleration_and_cap() {
        assert_eq!(axis_velocity(0.0, false, true, 16.0, 200.0), 16.0);
        assert_eq!(axis_velocity(195.0, false, true, 16.0, 200.0), 200.0);
        assert_eq!(axis_velocity(-195.0, true, false, 16.0, 200.0), -200.0);
    }

    #[test]
    fn test_idle_axis_decays_to_zero() {
        assert_eq!(axis_velocity(10.0, false, false, 16.0, 200.0), 0.0);
        assert_eq!(axis_velocity(-40.0, false, false, 16.0, 200.0), -24.0);
        // Opposing keys behave like no keys
        assert_eq!(axis_velocity(40.0, true, true, 16.0, 200.0), 24.0);
    }

    #[test]
    fn test_ice_slows_acceleration() {
        let settings = Settings::default();
        let mut world = World::default();
        let player = spawn::player(&mut world, GridPos::new(3, 3).to_world(), &settings);
        let input = TickInput {
            right: true,
            ..Default::default()
        };

        move_player(&mut world, player, &input, 10.0, &settings);
        assert_eq!(world.motion(player).unwrap().velocity.x, 10.0);

        world.get_mut(player).unwrap().player.as_mut().unwrap().on_ice = true;
        move_player(&mut world, player, &input, 10.0, &settings);
        assert!((world.motion(player).unwrap().velocity.x - 12.0).abs() < 1e-4);
        assert_eq!(
            world.get(player).unwrap().animation.unwrap().clip,
            Clip::MouseEast
        );
    }

    #[test]
    fn test_indicator_orbits_player() {
        let settings = Settings::default();
        let mut world = World::default();
        let origin = GridPos::new(5, 5).to_world();
        let player = spawn::player(&mut world, origin, &settings);
        let marker = spawn::indicator(&mut world, origin);

        place_indicator(&mut world, player, marker, origin + Vec2::new(300.0, 0.0), 40.0);
        let m = world.motion(marker).unwrap();
        assert_eq!(m.position, origin + Vec2::new(40.0, 0.0));
        assert_eq!(m.angle, 90.0);
    }

    #[test]
    fn test_fire_needs_charge() {
        let mut empty = state(0);
        assert!(fire_portal(&mut empty, Vec2::ZERO).is_none());
        assert!(empty.events.is_empty());

        let mut s = state(2);
        let origin = s.world.motion(s.player.unwrap()).unwrap().position;
        let shot = fire_portal(&mut s, origin + Vec2::new(0.0, -100.0)).unwrap();
        let e = s.world.get(shot).unwrap();
        assert_eq!(e.projectile, Some(ProjectileKind::Portal));
        assert_eq!(e.motion.velocity, Vec2::new(0.0, -300.0));
        assert_eq!(e.motion.position, origin);
        // Charge is only spent when the shot lands on a wall
        assert_eq!(s.portal_charge, 2);
        assert_eq!(s.events, vec![GameEvent::PortalShot]);
    }

    #[test]
    fn test_teleport_to_partner() {
        let mut s = state(2);
        let player = s.player.unwrap();
        let wall = s.world.wall_in_cell(GridPos::new(4, 0)).unwrap();
        let scale = Vec2::splat(CELL_SIZE);
        let near = spawn::portal(&mut s.world, GridPos::new(4, 0).to_world(), scale, Direction::Bottom, None);
        let far = spawn::portal(&mut s.world, GridPos::new(9, 3).to_world(), scale, Direction::Left, Some(near));
        s.proximity = Some(PortalProximity {
            player,
            portal: near,
            wall,
        });

        assert!(teleport(&mut s));
        assert_eq!(s.world.motion(player).unwrap().position, GridPos::new(8, 3).to_world());
        assert!(s.proximity.is_none());
        assert!(s.world.contains(far));
    }

    #[test]
    fn test_teleport_without_partner_is_noop() {
        let mut s = state(2);
        let player = s.player.unwrap();
        let wall = s.world.wall_in_cell(GridPos::new(4, 0)).unwrap();
        let before = s.world.motion(player).unwrap().position;
        let lonely = spawn::portal(
            &mut s.world,
            GridPos::new(4, 0).to_world(),
            Vec2::splat(CELL_SIZE),
            Direction::Bottom,
            None,
        );
        s.proximity = Some(PortalProximity {
            player,
            portal: lonely,
            wall,
        });
        assert!(!teleport(&mut s));
        assert_eq!(s.world.motion(player).unwrap().position, before);
    }

    #[test]
    fn test_clear_keeps_charge_spent() {
        let mut s = state(2);
        let scale = Vec2::splat(CELL_SIZE);
        let a = spawn::portal(&mut s.world, GridPos::new(0, 2).to_world(), scale, Direction::Right, None);
        s.opening_portal = Some(a);
        s.portal_charge = 1;

        clear_portals(&mut s);
        assert_eq!(s.world.count(Facet::Portal), 0);
        assert!(s.opening_portal.is_none());
        assert_eq!(s.portal_charge, 1);
    }
}
