//! Character variants: palettes, speech bubble style, message lists and the
//! figure painter. One descriptor drives the whole view.

use crate::draw::{figure, Canvas, Pose};
use crate::state::{tint::hex, Look};
use bevy::prelude::*;
use clap::ValueEnum;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Species {
    /// A small person with a switchable boy / girl look.
    Human,
    /// A dog-like pet with a wagging tail.
    Pet,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Palette {
    /// Resting shirt (human) or body (pet) color.
    pub rest: Color,
    pub walk: Color,
    pub hair: Color,
    pub skin: Color,
    /// Trousers (human) or paws (pet).
    pub legs: Color,
    /// Pupils and speech text.
    pub ink: Color,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BubbleStyle {
    /// Bubble center relative to the figure anchor.
    pub offset: Vec2,
    /// Tail tip relative to the figure anchor.
    pub tail_tip: Vec2,
    /// Width added per character of the message.
    pub char_width: f32,
    pub font_size: f32,
    pub outline: Color,
}

pub type Figure = fn(&Pose, &mut Canvas);

#[derive(Clone, Copy)]
pub struct Variant {
    pub species: Species,
    palettes: [Palette; 2],
    messages: [&'static [&'static str]; 2],
    pub bubble: BubbleStyle,
    /// Pupil swing amplitude in pixels.
    pub eye_swing: f32,
    pub figure: Figure,
}

const BOY_LINES: &[&str] = &[
    "Hey there!",
    "What's up?",
    "Let's play!",
    "I'm happy!",
    "Cool!",
    "Awesome!",
];
const GIRL_LINES: &[&str] = &[
    "Hi cutie!",
    "How are you?",
    "Let's have fun!",
    "I love this!",
    "So cute!",
    "Yay!",
];
const PET_LINES: &[&str] = &[
    "Woof!",
    "Hello friend!",
    "Pet me!",
    "I love you!",
    "Play with me!",
    "Wag wag!",
];

impl Variant {
    pub fn for_species(species: Species) -> Self {
        match species {
            Species::Human => Self::human(),
            Species::Pet => Self::pet(),
        }
    }

    pub fn human() -> Self {
        let skin = hex(0xFDBCB4);
        let boy = Palette {
            rest: hex(0x4169E1),
            walk: hex(0x87CEEB),
            hair: hex(0x8B4513),
            skin,
            legs: hex(0x000080),
            ink: hex(0x4169E1),
        };
        let girl = Palette {
            rest: hex(0xFF69B4),
            walk: hex(0xFFB6C1),
            hair: hex(0xFFD700),
            skin,
            legs: hex(0x8B008B),
            ink: hex(0x8B008B),
        };
        Self {
            species: Species::Human,
            palettes: [boy, girl],
            messages: [BOY_LINES, GIRL_LINES],
            bubble: BubbleStyle {
                offset: Vec2::new(45.0, -45.0),
                tail_tip: Vec2::new(15.0, -25.0),
                char_width: 7.0,
                font_size: 12.0,
                outline: hex(0x333333),
            },
            eye_swing: 1.0,
            figure: figure::human,
        }
    }

    pub fn pet() -> Self {
        let body = hex(0xFFB6C1);
        let palette = Palette {
            rest: body,
            walk: hex(0x87CEEB),
            hair: body,
            skin: body,
            legs: hex(0x333333),
            ink: Color::BLACK,
        };
        Self {
            species: Species::Pet,
            palettes: [palette, palette],
            messages: [PET_LINES, PET_LINES],
            bubble: BubbleStyle {
                offset: Vec2::new(50.0, -50.0),
                tail_tip: Vec2::new(20.0, -20.0),
                char_width: 8.0,
                font_size: 14.0,
                outline: Color::BLACK,
            },
            eye_swing: 2.0,
            figure: figure::pet,
        }
    }

    pub fn palette(&self, look: Look) -> &Palette {
        &self.palettes[look.index()]
    }

    pub fn messages(&self, look: Look) -> &'static [&'static str] {
        self.messages[look.index()]
    }

    /// Only the human has a second look to switch to.
    pub fn can_switch(&self) -> bool {
        self.species == Species::Human
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_looks_differ_and_pet_does_not() {
        let human = Variant::human();
        assert_ne!(human.palette(Look::Boy).rest, human.palette(Look::Girl).rest);
        assert_ne!(human.messages(Look::Boy), human.messages(Look::Girl));
        assert!(human.can_switch());

        let pet = Variant::pet();
        assert_eq!(pet.palette(Look::Boy), pet.palette(Look::Girl));
        assert!(!pet.can_switch());
    }

    #[test]
    fn every_list_has_six_lines() {
        for v in [Variant::human(), Variant::pet()] {
            for look in [Look::Boy, Look::Girl] {
                assert_eq!(v.messages(look).len(), 6);
            }
        }
    }
}
