use bevy::prelude::*;

use crate::drive::ActiveSession;
use crate::hud::{px, text_font};
use crate::scene::car_color;

const OVERLAY_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.75);
const CARD_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.05);
const CARD_SELECTED_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.2);
const TEXT_COLOR: Color = Color::srgb(0.95, 0.95, 0.95);
const LABEL_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

#[derive(Component)]
pub struct GarageOverlay;

#[derive(Component)]
pub struct GarageCarButton(pub usize);

fn card_style() -> Node {
    Node {
        width: px(220.0),
        flex_direction: FlexDirection::Column,
        padding: UiRect::all(px(12.0)),
        margin: UiRect::all(px(6.0)),
        row_gap: px(4.0),
        ..default()
    }
}

pub fn setup_garage(mut commands: Commands, session: Res<ActiveSession>) {
    let display = if session.0.garage_open() {
        Display::Flex
    } else {
        Display::None
    };

    commands
        .spawn((
            GarageOverlay,
            Node {
                display,
                position_type: PositionType::Absolute,
                left: px(0.0),
                right: px(0.0),
                top: px(0.0),
                bottom: px(0.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: px(12.0),
                ..default()
            },
            BackgroundColor(OVERLAY_BG),
        ))
        .with_children(|overlay| {
            overlay.spawn((Text::new("Garage"), text_font(28.0), TextColor(TEXT_COLOR)));
            overlay.spawn((
                Text::new("Click a car or press its number. G to drive."),
                text_font(14.0),
                TextColor(LABEL_COLOR),
            ));

            overlay
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    flex_wrap: FlexWrap::Wrap,
                    justify_content: JustifyContent::Center,
                    max_width: px(960.0),
                    ..default()
                })
                .with_children(|grid| {
                    for (index, entry) in session.0.catalog().entries().iter().enumerate() {
                        grid.spawn((
                            Button,
                            GarageCarButton(index),
                            card_style(),
                            BackgroundColor(CARD_BG),
                        ))
                        .with_children(|card| {
                            card.spawn((
                                Node {
                                    height: px(6.0),
                                    ..default()
                                },
                                BackgroundColor(car_color(entry.color)),
                            ));
                            card.spawn((
                                Text::new(format!("{}. {}", index + 1, entry.name)),
                                text_font(15.0),
                                TextColor(TEXT_COLOR),
                            ));
                            card.spawn((
                                Text::new(format!("Top speed: {}", entry.top_speed_label)),
                                text_font(12.0),
                                TextColor(LABEL_COLOR),
                            ));
                            card.spawn((
                                Text::new(format!("Base price: {}", entry.price_label)),
                                text_font(12.0),
                                TextColor(LABEL_COLOR),
                            ));
                        });
                    }
                });
        });
}

pub fn handle_garage_buttons(
    query: Query<(&Interaction, &GarageCarButton), Changed<Interaction>>,
    mut session: ResMut<ActiveSession>,
) {
    if !session.0.garage_open() {
        return;
    }

    for (interaction, button) in &query {
        if *interaction == Interaction::Pressed {
            if let Err(err) = session.0.select_car(button.0) {
                warn!("Garage selection failed: {err}");
            }
        }
    }
}

pub fn sync_garage_overlay(
    session: Res<ActiveSession>,
    mut overlay_query: Query<&mut Node, With<GarageOverlay>>,
    mut card_query: Query<(&GarageCarButton, &mut BackgroundColor)>,
) {
    let display = if session.0.garage_open() {
        Display::Flex
    } else {
        Display::None
    };
    for mut node in &mut overlay_query {
        if node.display != display {
            node.display = display;
        }
    }

    let active = session.0.active_index();
    for (button, mut background) in &mut card_query {
        let wanted = if button.0 == active {
            CARD_SELECTED_BG
        } else {
            CARD_BG
        };
        if background.0 != wanted {
            background.0 = wanted;
        }
    }
}
