use marauder_core::utils::colors::style;

const BANNER: &str = r"
   __  __                             _
  |  \/  | __ _ _ __ __ _ _   _  __| | ___ _ __
  | |\/| |/ _` | '__/ _` | | | |/ _` |/ _ \ '__|
  | |  | | (_| | | | (_| | |_| | (_| |  __/ |
  |_|  |_|\__,_|_|  \__,_|\__,_|\__,_|\___|_|";

pub fn render_banner(color: bool) -> String {
    format!(
        "{}\n  {}\n",
        style(BANNER.trim_start_matches('\n')).red().bold().render(color),
        style(format!(
            "v{}  terminal coding agent for OpenAI-compatible models",
            env!("CARGO_PKG_VERSION")
        ))
        .yellow()
        .render(color)
    )
}

pub fn render_commands_hint(color: bool) -> String {
    let commands = ["/quit", "/clear", "/mode", "/compact", "/help"]
        .iter()
        .map(|name| style(name).cyan().render(color))
        .collect::<Vec<_>>()
        .join("  ");
    format!("  Commands: {commands}\n")
}
