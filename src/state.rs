use bevy::prelude::*;

// ===== Geometry =====
pub const MATE_SIZE: f32 = 80.0;
pub const START_POS: Vec2 = Vec2::new(200.0, 200.0);

// ===== Physics (per frame) =====
pub const WALK_SPEED: f32 = 3.0;
pub const JUMP_VELOCITY: f32 = -15.0;
pub const GRAVITY: f32 = 0.8;

// ===== Animation phases (per frame) =====
pub const WALK_CYCLE_STEP: f32 = 0.2;
pub const TAIL_WAG_STEP: f32 = 0.2;
pub const EAR_BOUNCE_STEP: f32 = 0.15;
pub const HAPPINESS_DECAY: f32 = 0.01;

// Blink: eyes close after BLINK_START frames and the counter wraps after BLINK_END.
pub const BLINK_START: u32 = 180;
pub const BLINK_END: u32 = 190;

/// Frames each speech bubble message stays up.
pub const MESSAGE_FRAMES: u32 = 25;

/// Fixed tints shared by every variant.
pub mod tint {
    use bevy::prelude::Color;

    pub fn hex(rgb: u32) -> Color {
        Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn jump() -> Color {
        hex(0x98FB98)
    }

    pub fn talk() -> Color {
        hex(0xDDA0DD)
    }

    pub fn dance() -> Color {
        hex(0xF0E68C)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Behavior {
    #[default]
    Idle,
    Walking,
    Jumping,
    Talking,
}

/// Which human palette is worn. The pet ignores it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Look {
    #[default]
    Boy,
    Girl,
}

impl Look {
    pub fn toggled(self) -> Self {
        match self {
            Look::Boy => Look::Girl,
            Look::Girl => Look::Boy,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Look::Boy => 0,
            Look::Girl => 1,
        }
    }
}

/// What happened during one [`CharacterState::step`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StepReport {
    pub bounced: bool,
    pub landed: bool,
    pub talk_ended: bool,
}

#[derive(Clone, Debug)]
pub struct CharacterState {
    /// Top-left of the bounding square, canvas pixels (y down).
    pub pos: Vec2,
    pub size: f32,
    pub dx: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub ground_y: f32,
    pub behavior: Behavior,
    pub dragging: bool,
    pub walk_direction: f32,

    pub talk_timer: u32,
    pub blink_timer: u32,
    pub blinking: bool,

    pub walk_cycle: f32,
    pub tail_wag: f32,
    pub ear_bounce: f32,
    pub eye_offset: f32,

    pub happiness: f32,
    pub look: Look,
    /// Current body (pet) or shirt (human) color.
    pub tint: Color,
    /// Color `tint` falls back to once an effect ends.
    pub rest_tint: Color,
    pub hair: Color,

    /// Canvas size in logical pixels.
    pub bounds: Vec2,
}

impl CharacterState {
    pub fn new(bounds: Vec2, rest_tint: Color, hair: Color) -> Self {
        let mut st = Self {
            pos: START_POS,
            size: MATE_SIZE,
            dx: 0.0,
            jump_velocity: 0.0,
            gravity: GRAVITY,
            ground_y: START_POS.y,
            behavior: Behavior::Idle,
            dragging: false,
            walk_direction: 1.0,
            talk_timer: 0,
            blink_timer: 0,
            blinking: false,
            walk_cycle: 0.0,
            tail_wag: 0.0,
            ear_bounce: 0.0,
            eye_offset: 0.0,
            happiness: 0.0,
            look: Look::Boy,
            tint: rest_tint,
            rest_tint,
            hair,
            bounds,
        };
        st.clamp();
        st
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Circular hit test against the bounding square's inscribed circle.
    pub fn hit(&self, point: Vec2) -> bool {
        point.distance(self.center()) < self.size / 2.0
    }

    /// Largest legal top-left position.
    pub fn max_pos(&self) -> Vec2 {
        (self.bounds - Vec2::splat(self.size)).max(Vec2::ZERO)
    }

    pub fn clamp(&mut self) {
        self.pos = self.pos.clamp(Vec2::ZERO, self.max_pos());
    }

    pub fn move_to(&mut self, pos: Vec2) {
        self.pos = pos;
        self.clamp();
    }

    pub fn nudge(&mut self, delta: Vec2) {
        self.move_to(self.pos + delta);
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        self.clamp();
        // a jump in flight must still be able to land on the new floor
        self.ground_y = self.ground_y.min(self.max_pos().y);
    }

    pub fn talking(&self) -> bool {
        self.talk_timer > 0
    }

    /// Index into a message list of `len` entries for the current talk countdown.
    pub fn message_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.talk_timer / MESSAGE_FRAMES) as usize % len
    }

    /// Advance one display frame: physics unless dragging, then the countdowns
    /// and phase accumulators.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport::default();

        if !self.dragging {
            match self.behavior {
                Behavior::Walking => report.bounced = self.step_walk(),
                Behavior::Jumping => report.landed = self.step_jump(),
                Behavior::Idle | Behavior::Talking => {}
            }
        }

        if self.talk_timer > 0 {
            self.talk_timer -= 1;
            if self.talk_timer == 0 {
                report.talk_ended = true;
                if self.behavior == Behavior::Talking {
                    self.behavior = Behavior::Idle;
                }
                if self.tint == tint::talk() {
                    self.tint = self.rest_tint;
                }
            }
        }

        self.blink_timer += 1;
        if self.blink_timer > BLINK_START {
            self.blinking = true;
            if self.blink_timer > BLINK_END {
                self.blinking = false;
                self.blink_timer = 0;
            }
        }

        self.walk_cycle += WALK_CYCLE_STEP;
        self.tail_wag += TAIL_WAG_STEP;
        self.ear_bounce += EAR_BOUNCE_STEP;
        self.happiness = (self.happiness - HAPPINESS_DECAY).max(0.0);

        report
    }

    fn step_walk(&mut self) -> bool {
        self.pos.x += self.dx;
        self.clamp();
        let max_x = self.max_pos().x;
        if max_x <= 0.0 {
            return false;
        }
        if self.pos.x <= 0.0 || self.pos.x >= max_x {
            self.dx = -self.dx;
            self.walk_direction = -self.walk_direction;
            return true;
        }
        false
    }

    fn step_jump(&mut self) -> bool {
        self.pos.y += self.jump_velocity;
        self.jump_velocity += self.gravity;
        self.clamp();

        let floor = self.ground_y.min(self.max_pos().y);
        if self.pos.y >= floor {
            self.pos.y = floor;
            self.ground_y = floor;
            self.jump_velocity = 0.0;
            self.behavior = Behavior::Idle;
            self.tint = self.rest_tint;
            self.happiness = 0.0;
            return true;
        }
        false
    }
}
