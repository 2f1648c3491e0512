use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// Terminal palette. Every accessor yields [`Color::Reset`] when color output is off.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
  enabled: bool,
  theme: Theme,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  const fn pick(&self, dark: Color, light: Color) -> Color {
    if !self.enabled {
      return Color::Reset;
    }
    match self.theme {
      Theme::Dark => dark,
      Theme::Light => light,
    }
  }

  pub const fn timestamp(&self) -> Color {
    self.pick(Color::Rgb { r: 128, g: 150, b: 170 }, Color::Rgb { r: 84, g: 96, b: 110 })
  }

  pub const fn primary(&self) -> Color {
    self.pick(Color::Rgb { r: 88, g: 166, b: 255 }, Color::Rgb { r: 36, g: 90, b: 160 })
  }

  pub const fn accent(&self) -> Color {
    self.pick(Color::Rgb { r: 230, g: 120, b: 90 }, Color::Rgb { r: 190, g: 70, b: 50 })
  }

  pub const fn success(&self) -> Color {
    self.pick(Color::Rgb { r: 120, g: 200, b: 140 }, Color::Rgb { r: 34, g: 130, b: 80 })
  }

  pub const fn label(&self) -> Color {
    self.pick(Color::Rgb { r: 200, g: 200, b: 120 }, Color::Rgb { r: 120, g: 100, b: 40 })
  }

  pub const fn value(&self) -> Color {
    self.pick(Color::Rgb { r: 240, g: 220, b: 160 }, Color::Rgb { r: 60, g: 60, b: 60 })
  }
}

/// Converts a terminal color into the table renderer's color type.
pub fn table_color(color: Color) -> ComfyColor {
  match color {
    Color::Reset => ComfyColor::Reset,
    Color::Black => ComfyColor::Black,
    Color::DarkGrey => ComfyColor::DarkGrey,
    Color::Red => ComfyColor::Red,
    Color::DarkRed => ComfyColor::DarkRed,
    Color::Green => ComfyColor::Green,
    Color::DarkGreen => ComfyColor::DarkGreen,
    Color::Yellow => ComfyColor::Yellow,
    Color::DarkYellow => ComfyColor::DarkYellow,
    Color::Blue => ComfyColor::Blue,
    Color::DarkBlue => ComfyColor::DarkBlue,
    Color::Magenta => ComfyColor::Magenta,
    Color::DarkMagenta => ComfyColor::DarkMagenta,
    Color::Cyan => ComfyColor::Cyan,
    Color::DarkCyan => ComfyColor::DarkCyan,
    Color::White => ComfyColor::White,
    Color::Grey => ComfyColor::Grey,
    Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
    Color::AnsiValue(value) => ComfyColor::AnsiValue(value),
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => theme_from_env(std::env::var("COLORFGBG").ok().as_deref()),
  }
}

/// `COLORFGBG` is `fg;bg`; background palette indices 8 and up are light.
fn theme_from_env(colorfgbg: Option<&str>) -> Theme {
  if let Some(value) = colorfgbg
    && let Some(background) = value.split(';').next_back()
    && let Ok(index) = background.parse::<u8>()
    && index >= 8
  {
    return Theme::Light;
  }
  Theme::Dark
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn disabled_colors_reset() {
    let colors = Colors::new(false, Theme::Dark);
    assert_eq!(colors.primary(), Color::Reset);
    assert_eq!(colors.label(), Color::Reset);
  }

  #[test]
  fn theme_follows_colorfgbg_background() {
    assert_eq!(theme_from_env(Some("0;15")), Theme::Light);
    assert_eq!(theme_from_env(Some("15;0")), Theme::Dark);
    assert_eq!(theme_from_env(Some("garbage")), Theme::Dark);
    assert_eq!(theme_from_env(None), Theme::Dark);
  }
}
