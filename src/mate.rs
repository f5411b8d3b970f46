use crate::state::{tint, Behavior, CharacterState, StepReport, JUMP_VELOCITY, WALK_SPEED};
use crate::tasks::{Delayed, Fired, Tasks, TIMED_DANCE_TICKS};
use crate::variant::Variant;
use bevy::prelude::*;
use clap::ValueEnum;
use std::time::Duration;

// ===== Timed mode durations =====
pub const TIMED_WALK: Duration = Duration::from_millis(4000);
pub const TIMED_JUMP_TINT: Duration = Duration::from_millis(1200);
pub const TIMED_TALK_TINT: Duration = Duration::from_millis(2000);
pub const SWITCH_HAPPINESS: Duration = Duration::from_millis(2000);

/// Talk countdowns, in frames.
pub const TIMED_TALK_FRAMES: u32 = 120;
pub const OPEN_TALK_FRAMES: u32 = 9999;

// Dance perturbation
const DANCE_SWAY_X: f32 = 8.0;
const DANCE_SWAY_Y: f32 = 4.0;

/// How behaviors are started and stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum ControlMode {
    /// Right-click menu and keyboard shortcuts; behaviors toggle.
    Menu,
    /// Control bar buttons; behaviors end on their own.
    Timed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Walk,
    Jump,
    Talk,
    Dance,
    SwitchLook,
}

/// The one character the view owns: state, pending effects, variant and mode.
#[derive(Resource)]
pub struct Mate {
    pub state: CharacterState,
    pub tasks: Tasks,
    pub variant: Variant,
    pub mode: ControlMode,
}

impl Mate {
    pub fn new(variant: Variant, mode: ControlMode, bounds: Vec2) -> Self {
        let look = Default::default();
        let palette = variant.palette(look);
        let state = CharacterState::new(bounds, palette.rest, palette.hair);
        Self {
            state,
            tasks: Tasks::default(),
            variant,
            mode,
        }
    }

    pub fn dancing(&self) -> bool {
        self.tasks.dancing()
    }

    pub fn perform(&mut self, action: Action) {
        debug!("mate action {:?} ({:?})", action, self.mode);
        match action {
            Action::Walk => self.walk(),
            Action::Jump => self.jump(),
            Action::Talk => self.talk(),
            Action::Dance => self.dance(),
            Action::SwitchLook => self.switch_look(),
        }
    }

    fn rest(&mut self) {
        self.state.tint = self.state.rest_tint;
        self.state.happiness = 0.0;
    }

    fn walk(&mut self) {
        let st = &mut self.state;
        match (self.mode, st.behavior) {
            (_, Behavior::Jumping) => {}
            (ControlMode::Menu, Behavior::Walking) => {
                st.behavior = Behavior::Idle;
                st.dx = 0.0;
                self.rest();
            }
            (mode, _) => {
                st.behavior = Behavior::Walking;
                st.dx = WALK_SPEED * st.walk_direction;
                st.tint = self.variant.palette(st.look).walk;
                st.happiness = 0.3;
                if mode == ControlMode::Timed {
                    self.tasks.schedule(Delayed::WalkStop, TIMED_WALK);
                }
            }
        }
    }

    fn jump(&mut self) {
        let st = &mut self.state;
        if st.behavior == Behavior::Jumping {
            return;
        }
        st.behavior = Behavior::Jumping;
        st.jump_velocity = JUMP_VELOCITY;
        st.ground_y = st.pos.y;
        st.tint = tint::jump();
        st.happiness = 0.5;
        if self.mode == ControlMode::Timed {
            self.tasks.schedule(Delayed::TintReset, TIMED_JUMP_TINT);
        }
    }

    fn talk(&mut self) {
        let st = &mut self.state;
        if self.mode == ControlMode::Menu && st.talking() {
            st.talk_timer = 0;
            if st.behavior == Behavior::Talking {
                st.behavior = Behavior::Idle;
            }
            self.rest();
            return;
        }

        st.talk_timer = match self.mode {
            ControlMode::Menu => OPEN_TALK_FRAMES,
            ControlMode::Timed => TIMED_TALK_FRAMES,
        };
        if st.behavior == Behavior::Idle {
            st.behavior = Behavior::Talking;
        }
        st.tint = tint::talk();
        st.happiness = 0.4;
        if self.mode == ControlMode::Timed {
            self.tasks.schedule(Delayed::TintReset, TIMED_TALK_TINT);
        }
    }

    fn dance(&mut self) {
        match self.mode {
            ControlMode::Menu if self.tasks.stop_dance() => self.rest(),
            ControlMode::Menu => self.tasks.start_dance(None),
            ControlMode::Timed => self.tasks.start_dance(Some(TIMED_DANCE_TICKS)),
        }
        if self.tasks.dancing() {
            self.state.tint = tint::dance();
            self.state.happiness = 0.6;
        }
    }

    fn switch_look(&mut self) {
        if !self.variant.can_switch() {
            return;
        }
        let st = &mut self.state;
        st.look = st.look.toggled();
        let palette = self.variant.palette(st.look);
        st.rest_tint = palette.rest;
        st.tint = palette.rest;
        st.hair = palette.hair;
        st.happiness = 0.5;
        self.tasks.schedule(Delayed::HappinessReset, SWITCH_HAPPINESS);
        info!("switched look to {:?}", st.look);
    }

    /// Grab the character: cancels the current behavior and zeroes velocities.
    pub fn begin_drag(&mut self) {
        let st = &mut self.state;
        st.dragging = true;
        st.behavior = Behavior::Idle;
        st.dx = 0.0;
        st.jump_velocity = 0.0;
    }

    pub fn end_drag(&mut self) {
        self.state.dragging = false;
    }

    /// Per-frame update.
    pub fn frame(&mut self) -> StepReport {
        self.state.step()
    }

    /// Advance wall-clock effects.
    pub fn tick(&mut self, dt: Duration) {
        for fired in self.tasks.tick(dt) {
            match fired {
                Fired::Delayed(Delayed::TintReset) => self.state.tint = self.state.rest_tint,
                Fired::Delayed(Delayed::HappinessReset) => self.state.happiness = 0.0,
                Fired::Delayed(Delayed::WalkStop) => {
                    // a jump or a drag may have taken over since the walk started
                    if self.state.behavior == Behavior::Walking {
                        self.state.behavior = Behavior::Idle;
                        self.state.tint = self.state.rest_tint;
                    }
                    self.state.dx = 0.0;
                }
                Fired::DanceStep(n) => {
                    if !self.state.dragging {
                        let n = n as f32;
                        let sway = Vec2::new(
                            (n * 0.3).sin() * DANCE_SWAY_X,
                            (n * 0.4).cos() * DANCE_SWAY_Y,
                        );
                        self.state.nudge(sway);
                    }
                }
                Fired::DanceDone => self.state.tint = self.state.rest_tint,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Look;
    use crate::variant::Variant;

    fn mate(mode: ControlMode) -> Mate {
        Mate::new(Variant::human(), mode, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn menu_walk_toggles() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Walk);
        assert_eq!(m.state.behavior, Behavior::Walking);
        assert_eq!(m.state.dx, WALK_SPEED);
        assert_eq!(m.state.tint, m.variant.palette(Look::Boy).walk);
        m.perform(Action::Walk);
        assert_eq!(m.state.behavior, Behavior::Idle);
        assert_eq!(m.state.dx, 0.0);
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn timed_walk_stops_after_four_seconds() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Walk);
        m.tick(Duration::from_millis(3999));
        assert_eq!(m.state.behavior, Behavior::Walking);
        m.tick(Duration::from_millis(1));
        assert_eq!(m.state.behavior, Behavior::Idle);
        assert_eq!(m.state.dx, 0.0);
    }

    #[test]
    fn timed_walk_stop_does_not_cancel_a_jump() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Walk);
        m.perform(Action::Jump);
        m.tick(TIMED_WALK);
        assert_eq!(m.state.behavior, Behavior::Jumping);
    }

    #[test]
    fn walk_is_ignored_mid_air() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Jump);
        m.perform(Action::Walk);
        assert_eq!(m.state.behavior, Behavior::Jumping);
    }

    #[test]
    fn jump_is_not_reentrant() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Jump);
        m.frame();
        let v = m.state.jump_velocity;
        let ground = m.state.ground_y;
        m.perform(Action::Jump);
        assert_eq!(m.state.jump_velocity, v);
        assert_eq!(m.state.ground_y, ground);
    }

    #[test]
    fn second_timed_jump_restarts_tint_reset() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Jump);
        for _ in 0..60 {
            m.frame();
        }
        assert_eq!(m.state.behavior, Behavior::Idle);
        m.tick(Duration::from_millis(1000));
        m.perform(Action::Jump);
        m.tick(Duration::from_millis(1000));
        assert_eq!(m.state.tint, tint::jump());
        m.tick(Duration::from_millis(200));
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn menu_talk_toggles_open_ended_countdown() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Talk);
        assert_eq!(m.state.talk_timer, OPEN_TALK_FRAMES);
        assert_eq!(m.state.behavior, Behavior::Talking);
        m.perform(Action::Talk);
        assert_eq!(m.state.talk_timer, 0);
        assert_eq!(m.state.behavior, Behavior::Idle);
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn talk_overlays_walking() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Walk);
        m.perform(Action::Talk);
        assert_eq!(m.state.behavior, Behavior::Walking);
        assert!(m.state.talking());
    }

    #[test]
    fn timed_talk_is_fixed_length() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Talk);
        m.perform(Action::Talk);
        assert_eq!(m.state.talk_timer, TIMED_TALK_FRAMES);
        m.tick(TIMED_TALK_TINT);
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn menu_dance_toggles() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Dance);
        assert!(m.dancing());
        assert_eq!(m.state.tint, tint::dance());
        let start = m.state.pos;
        m.tick(Duration::from_millis(600));
        assert_ne!(m.state.pos, start);
        m.perform(Action::Dance);
        assert!(!m.dancing());
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn dance_holds_still_while_dragged() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Dance);
        m.begin_drag();
        let start = m.state.pos;
        m.tick(Duration::from_millis(600));
        assert_eq!(m.state.pos, start);
    }

    #[test]
    fn timed_dance_restarts_instead_of_stacking() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Dance);
        m.tick(Duration::from_millis(60 * 40));
        m.perform(Action::Dance);
        m.tick(Duration::from_millis(60 * 79));
        assert!(m.dancing());
        m.tick(Duration::from_millis(60));
        assert!(!m.dancing());
        assert_eq!(m.state.tint, m.state.rest_tint);
    }

    #[test]
    fn switch_look_swaps_palette_and_resets_happiness_later() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::SwitchLook);
        assert_eq!(m.state.look, Look::Girl);
        assert_eq!(m.state.tint, m.variant.palette(Look::Girl).rest);
        assert_eq!(m.state.hair, m.variant.palette(Look::Girl).hair);
        assert_eq!(m.state.happiness, 0.5);
        m.tick(SWITCH_HAPPINESS);
        assert_eq!(m.state.happiness, 0.0);
        m.perform(Action::SwitchLook);
        assert_eq!(m.state.look, Look::Boy);
    }

    #[test]
    fn pet_cannot_switch() {
        let mut m = Mate::new(Variant::pet(), ControlMode::Menu, Vec2::new(1280.0, 720.0));
        m.perform(Action::SwitchLook);
        assert_eq!(m.state.look, Look::Boy);
        assert_eq!(m.state.happiness, 0.0);
    }

    #[test]
    fn drag_cancels_behavior_and_velocity() {
        let mut m = mate(ControlMode::Menu);
        m.perform(Action::Jump);
        m.frame();
        m.begin_drag();
        assert_eq!(m.state.behavior, Behavior::Idle);
        assert_eq!(m.state.jump_velocity, 0.0);
        assert_eq!(m.state.dx, 0.0);
        m.end_drag();
        assert!(!m.state.dragging);
    }
}
