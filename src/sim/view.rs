//! Read-only snapshot for renderers and HUDs
//!
//! The core never draws. Hosts call [`draw_list`] after a tick and paint
//! whatever it returns.

use glam::Vec2;
use serde::Serialize;

use super::entity::{Projectile, Visual};
use super::starfield::Star;
use super::state::{Mode, RunState};

/// One drawable entity, centered on `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawItem<'a> {
    pub pos: Vec2,
    pub size: Vec2,
    pub visual: &'a Visual,
}

impl<'a> DrawItem<'a> {
    fn from_projectile(shot: &'a Projectile) -> Self {
        Self {
            pos: shot.pos,
            size: shot.size,
            visual: &shot.visual,
        }
    }
}

/// Plain numbers for the heads-up display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub elapsed_secs: f64,
    pub mode: Mode,
}

/// Everything visible this frame, back to front
#[derive(Debug, Clone, Serialize)]
pub struct DrawList<'a> {
    pub stars: &'a [Star],
    pub enemies: Vec<DrawItem<'a>>,
    pub enemy_shots: Vec<DrawItem<'a>>,
    pub player_shots: Vec<DrawItem<'a>>,
    /// Hidden on the Home screen
    pub player: Option<DrawItem<'a>>,
    pub hud: Hud,
}

pub fn hud(state: &RunState) -> Hud {
    Hud {
        score: state.score,
        lives: state.lives,
        level: state.level,
        elapsed_secs: state.elapsed_secs(),
        mode: state.mode,
    }
}

/// Build the frame's draw list. Inactive projectiles are skipped.
pub fn draw_list(state: &RunState) -> DrawList<'_> {
    let enemies = state
        .enemies
        .iter()
        .map(|enemy| DrawItem {
            pos: enemy.pos,
            size: enemy.size,
            visual: &enemy.visual,
        })
        .collect();
    let enemy_shots = state
        .enemy_shots
        .iter()
        .filter(|shot| shot.active)
        .map(DrawItem::from_projectile)
        .collect();
    let player_shots = state
        .player_shots
        .iter()
        .filter(|shot| shot.active)
        .map(DrawItem::from_projectile)
        .collect();
    let player = (state.mode != Mode::Home).then(|| DrawItem {
        pos: state.player.pos,
        size: state.player.size,
        visual: &state.player.visual,
    });

    DrawList {
        stars: &state.starfield.stars,
        enemies,
        enemy_shots,
        player_shots,
        player,
        hud: hud(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::settings::Settings;
    use crate::sim::entity::Owner;
    use crate::sim::level::start_run;

    #[test]
    fn test_draw_list_reflects_state() {
        let levels = LevelTable::builtin();
        let mut state = RunState::new(&Settings::default(), &levels).unwrap();
        assert!(draw_list(&state).player.is_none());

        start_run(&mut state, &levels);
        state.score = 42;
        let mut spent = Projectile::new(Vec2::new(5.0, 5.0), -6.0, Owner::Player, "yellow");
        spent.active = false;
        state.player_shots.push(spent);
        state
            .player_shots
            .push(Projectile::new(Vec2::new(9.0, 9.0), -6.0, Owner::Player, "yellow"));

        let list = draw_list(&state);
        let player = list.player.unwrap();
        assert_eq!(player.visual, &Visual::sprite("vaisseau"));
        assert_eq!(list.player_shots.len(), 1);
        assert_eq!(list.player_shots[0].pos, Vec2::new(9.0, 9.0));
        assert_eq!(list.stars.len(), 60);
        assert_eq!(list.hud.score, 42);
        assert_eq!(list.hud.lives, 3);
        assert_eq!(list.hud.mode, Mode::Running);
    }
}
