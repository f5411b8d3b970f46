//! Keyboard shortcuts (menu mode) and the bottom control bar (timed mode).

use crate::mate::{Action, Mate};
use crate::variant::Variant;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

const BAR_BOTTOM: f32 = 24.0;
const BUTTON_SIZE: Vec2 = Vec2::new(72.0, 32.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shortcut {
    Act(Action),
    Close,
}

/// Physical-key mapping, so letter case and layout modifiers do not matter.
pub fn shortcut(key: KeyCode, variant: &Variant) -> Option<Shortcut> {
    let action = match key {
        KeyCode::KeyW => Action::Walk,
        KeyCode::KeyJ => Action::Jump,
        KeyCode::KeyT => Action::Talk,
        KeyCode::KeyD => Action::Dance,
        KeyCode::KeyS if variant.can_switch() => Action::SwitchLook,
        KeyCode::Escape => return Some(Shortcut::Close),
        _ => return None,
    };
    Some(Shortcut::Act(action))
}

pub fn button_background(interaction: Interaction) -> BackgroundColor {
    BackgroundColor(match interaction {
        Interaction::Pressed => Color::srgba(0.45, 0.45, 0.55, 0.95),
        Interaction::Hovered => Color::srgba(0.3, 0.3, 0.38, 0.95),
        Interaction::None => Color::srgba(0.18, 0.18, 0.22, 0.9),
    })
}

/// Presses (auto-repeat included) drive the mate; Escape closes the window.
pub fn keyboard(
    mut commands: Commands,
    mut keys: EventReader<KeyboardInput>,
    mut mate: ResMut<Mate>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    for key in keys.read() {
        if key.state != ButtonState::Pressed {
            continue;
        }
        match shortcut(key.key_code, &mate.variant) {
            Some(Shortcut::Act(action)) => mate.perform(action),
            Some(Shortcut::Close) => {
                info!("escape pressed, closing the window");
                for window in &windows {
                    commands.entity(window).despawn();
                }
            }
            None => {}
        }
    }
}

#[derive(Component, Clone, Copy)]
pub struct ControlButton(pub Action);

pub fn bar_actions(variant: &Variant) -> Vec<(Action, &'static str)> {
    let mut actions = vec![
        (Action::Walk, "Walk"),
        (Action::Jump, "Jump"),
        (Action::Talk, "Talk"),
        (Action::Dance, "Dance"),
    ];
    if variant.can_switch() {
        actions.push((Action::SwitchLook, "Switch"));
    }
    actions
}

pub fn spawn_control_bar(mut commands: Commands, mate: Res<Mate>) {
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                bottom: Val::Px(BAR_BOTTOM),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(8.0),
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            for (action, label) in bar_actions(&mate.variant) {
                parent
                    .spawn((
                        ButtonBundle {
                            style: Style {
                                width: Val::Px(BUTTON_SIZE.x),
                                height: Val::Px(BUTTON_SIZE.y),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            background_color: button_background(Interaction::None),
                            ..default()
                        },
                        ControlButton(action),
                    ))
                    .with_children(|button| {
                        button.spawn(TextBundle::from_section(
                            label,
                            TextStyle {
                                font_size: 16.0,
                                color: Color::WHITE,
                                ..default()
                            },
                        ));
                    });
            }
        });
}

pub fn control_buttons(
    mut mate: ResMut<Mate>,
    mut buttons: Query<(&Interaction, &ControlButton, &mut BackgroundColor), Changed<Interaction>>,
) {
    for (interaction, button, mut background) in &mut buttons {
        *background = button_background(*interaction);
        if *interaction == Interaction::Pressed {
            mate.perform(button.0);
        }
    }
}

/// Screen rectangles of the bar buttons, for the passthrough hit region.
pub fn bar_rects(buttons: &Query<(&Node, &GlobalTransform), With<ControlButton>>) -> Vec<Rect> {
    buttons
        .iter()
        .map(|(node, transform)| {
            Rect::from_center_size(transform.translation().truncate(), node.size())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_actions() {
        let human = Variant::human();
        assert_eq!(shortcut(KeyCode::KeyW, &human), Some(Shortcut::Act(Action::Walk)));
        assert_eq!(shortcut(KeyCode::KeyJ, &human), Some(Shortcut::Act(Action::Jump)));
        assert_eq!(shortcut(KeyCode::KeyT, &human), Some(Shortcut::Act(Action::Talk)));
        assert_eq!(shortcut(KeyCode::KeyD, &human), Some(Shortcut::Act(Action::Dance)));
        assert_eq!(shortcut(KeyCode::KeyS, &human), Some(Shortcut::Act(Action::SwitchLook)));
        assert_eq!(shortcut(KeyCode::Escape, &human), Some(Shortcut::Close));
        assert_eq!(shortcut(KeyCode::KeyQ, &human), None);
    }

    #[test]
    fn pet_has_no_switch_key_or_button() {
        let pet = Variant::pet();
        assert_eq!(shortcut(KeyCode::KeyS, &pet), None);
        assert_eq!(bar_actions(&pet).len(), 4);
        assert_eq!(bar_actions(&Variant::human()).len(), 5);
    }

    #[test]
    fn keyboard_system_toggles_walk_and_closes_on_escape() {
        use crate::mate::ControlMode;
        use crate::state::Behavior;

        let mut app = App::new();
        app.add_event::<KeyboardInput>()
            .insert_resource(Mate::new(
                Variant::human(),
                ControlMode::Menu,
                Vec2::new(800.0, 600.0),
            ))
            .add_systems(Update, keyboard);
        let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();

        let press = |key_code| KeyboardInput {
            key_code,
            logical_key: bevy::input::keyboard::Key::Unidentified(
                bevy::input::keyboard::NativeKey::Unidentified,
            ),
            state: ButtonState::Pressed,
            window,
        };
        app.world_mut().send_event(press(KeyCode::KeyW));
        app.update();
        assert_eq!(app.world().resource::<Mate>().state.behavior, Behavior::Walking);

        // auto-repeat is a second press
        app.world_mut().send_event(press(KeyCode::KeyW));
        app.update();
        assert_eq!(app.world().resource::<Mate>().state.behavior, Behavior::Idle);

        app.world_mut().send_event(press(KeyCode::Escape));
        app.update();
        assert!(app.world().get_entity(window).is_none());
    }
}
