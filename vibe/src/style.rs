//! Terminal styles.
use anstyle::Color;
use anstyle::RgbColor;
use anstyle::Style;
use crate::config::Settings;
use crate::util::ColorPair;

/// Prompt label, prompt arrow and message styles of one speaker.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    /// Prompt label style.
    pub prompt: Style,
    /// Prompt arrow style.
    pub arrow: Style,
    /// Message style.
    pub text: Style,
}

impl Palette {
    fn new(colors: ColorPair, default_fg: [u8;3], default_bg: [u8;3]) -> Self {
        let [r1, g1, b1] = colors.0.unwrap_or(default_fg);
        let [r2, g2, b2] = colors.1.unwrap_or(default_bg);
        let fg = Color::Rgb(RgbColor(r1, g1, b1));
        let bg = Color::Rgb(RgbColor(r2, g2, b2));
        let white = Color::Rgb(RgbColor(255, 255, 255));

        Palette {
            prompt: Style::new().bold().bg_color(Some(bg)).fg_color(Some(white)),
            arrow: Style::new().bold().fg_color(Some(bg)),
            text: Style::new().fg_color(Some(fg)),
        }
    }

    /// Render a colored ` LABEL ` prompt followed by an arrow.
    pub fn label(&self, label: &str) -> String {
        format!("{} {} {:#}{} {:#}", self.prompt, label, self.prompt, self.arrow, self.arrow)
    }
}

/// Styles.
#[derive(Clone, Copy, Debug)]
pub struct Styles {
    /// User prompt and input.
    pub user: Palette,
    /// Assistant replies.
    pub assistant: Palette,
    /// Tool output.
    pub tool: Palette,
}

impl Styles {

    /// Load styles.
    pub fn new(settings: &Settings) -> Self {
        Styles {
            user: Palette::new(settings.user_color, [128, 64, 64], [128, 0, 0]),
            assistant: Palette::new(settings.assistant_color, [64, 128, 64], [0, 128, 0]),
            tool: Palette::new(settings.tool_color, [128, 128, 0], [64, 64, 0]),
        }
    }
}
