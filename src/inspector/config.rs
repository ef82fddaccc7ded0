//! Configuration constants for the inspector UI.

use bevy::prelude::*;
use bevy::ui::Val;

/// Configuration for inspector UI layout and styling.
#[derive(Resource, Clone)]
pub struct InspectorConfig {
    // Window
    /// Inspector window size in logical pixels.
    pub window_size: UVec2,

    // Layout
    /// Height of the title bar.
    pub title_bar_height: Val,
    /// Width of the label column in field rows.
    pub label_width: Val,
    /// Minimum height of a text area.
    pub text_area_min_height: Val,

    // Spacing
    /// Padding inside panels.
    pub panel_padding: UiRect,
    /// Gap between field rows.
    pub item_gap: Val,
    /// Gap between label and control.
    pub column_gap: Val,
    /// Space above a section heading.
    pub section_gap: Val,

    // Typography
    pub title_font_size: f32,
    pub body_font_size: f32,
    pub small_font_size: f32,

    // Colors (for non-themed elements)
    pub border_color: Color,
    pub muted_text_color: Color,
    pub error_text_color: Color,
    /// Label colour of required fields.
    pub required_color: Color,
    /// Background of an editable control.
    pub field_background: Color,
    /// Inline code in node documentation.
    pub doc_code_color: Color,

    // Behaviour
    /// Maximum number of auto-complete suggestions shown at once.
    pub max_suggestions: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            window_size: UVec2::new(340, 720),

            title_bar_height: Val::Px(44.0),
            label_width: Val::Px(96.0),
            text_area_min_height: Val::Px(40.0),

            panel_padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
            item_gap: Val::Px(6.0),
            column_gap: Val::Px(8.0),
            section_gap: Val::Px(14.0),

            title_font_size: 18.0,
            body_font_size: 13.0,
            small_font_size: 11.0,

            border_color: Color::srgba(0.3, 0.3, 0.3, 1.0),
            muted_text_color: Color::srgba(0.6, 0.6, 0.6, 1.0),
            error_text_color: Color::srgba(0.9, 0.35, 0.35, 1.0),
            required_color: Color::srgba(0.95, 0.45, 0.45, 1.0),
            field_background: Color::srgba(0.15, 0.15, 0.15, 1.0),
            doc_code_color: Color::srgba(0.85, 0.75, 0.5, 1.0),

            max_suggestions: 8,
        }
    }
}
