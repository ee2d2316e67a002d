/// Console commands understood by the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select the first object whose name contains the query
    Search(String),
    /// Pointer event at pixel coordinates, origin top-left
    Click { x: f64, y: f64 },
    Escape,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub const HELP: &'static str = "commands: search <name> | click <x> <y> | escape | status | help | quit";

    /// Parse one console line. A leading `/` or `\` is accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use orbitrack_frontend::command::Command;
    ///
    /// assert_eq!(Command::parse("search iss"), Command::Search("iss".to_string()));
    /// assert_eq!(Command::parse("/click 10 20"), Command::Click { x: 10.0, y: 20.0 });
    /// ```
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }

        let without_prefix = trimmed.trim_start_matches(['/', '\\']);
        let (name, rest) = match without_prefix.find(char::is_whitespace) {
            Some(pos) => (&without_prefix[..pos], without_prefix[pos..].trim()),
            None => (without_prefix, ""),
        };

        match name.to_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "click" | "c" => Self::parse_click(rest).unwrap_or_else(|| Command::Unknown(trimmed.to_string())),
            "escape" | "esc" => Command::Escape,
            "status" => Command::Status,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }

    fn parse_click(arguments: &str) -> Option<Self> {
        let mut parts = arguments.split_whitespace();
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Command::Click { x, y })
    }
}
