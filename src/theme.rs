use console::Style;

// Terminal palette

// Headings and "working on it" messages
pub fn heading() -> Style {
    Style::new().cyan()
}

// Menu entries
pub fn menu_item() -> Style {
    Style::new().white()
}

// Video details printed before a download
pub fn detail() -> Style {
    Style::new().yellow()
}

pub fn success() -> Style {
    Style::new().green()
}

pub fn error() -> Style {
    Style::new().red()
}

pub fn warning() -> Style {
    Style::new().yellow()
}
