//! ANSI styling for terminal output, built on anstyle.

use anstyle::{AnsiColor, Color, Effects, Style};

/// Start styling `text`; chain color and effect calls, then display it.
pub fn style(text: impl std::fmt::Display) -> StyledString {
    StyledString {
        text: text.to_string(),
        style: Style::new(),
    }
}

pub struct StyledString {
    text: String,
    style: Style,
}

impl StyledString {
    fn fg(mut self, color: AnsiColor) -> Self {
        self.style = self.style.fg_color(Some(Color::Ansi(color)));
        self
    }

    fn effect(mut self, effect: Effects) -> Self {
        self.style = self.style.effects(self.style.get_effects() | effect);
        self
    }

    pub fn red(self) -> Self {
        self.fg(AnsiColor::Red)
    }

    pub fn green(self) -> Self {
        self.fg(AnsiColor::Green)
    }

    pub fn yellow(self) -> Self {
        self.fg(AnsiColor::Yellow)
    }

    pub fn cyan(self) -> Self {
        self.fg(AnsiColor::Cyan)
    }

    pub fn magenta(self) -> Self {
        self.fg(AnsiColor::Magenta)
    }

    pub fn bold(self) -> Self {
        self.effect(Effects::BOLD)
    }

    pub fn dimmed(self) -> Self {
        self.effect(Effects::DIMMED)
    }

    pub fn italic(self) -> Self {
        self.effect(Effects::ITALIC)
    }

    /// The styled text, or the bare text when `enabled` is false.
    pub fn render(&self, enabled: bool) -> String {
        if enabled {
            self.to_string()
        } else {
            self.text.clone()
        }
    }
}

impl std::fmt::Display for StyledString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.style.render(),
            self.text,
            self.style.render_reset()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::style;

    #[test]
    fn plain_render_strips_escapes() {
        let styled = style("ok").green().bold();
        assert_eq!(styled.render(false), "ok");
        assert!(styled.render(true).contains("\u{1b}["));
    }
}
