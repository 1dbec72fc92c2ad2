//! Text rendering utilities for error messages and resolution plans.
//!
//! Rust type names come out of [`std::any::type_name`] fully qualified,
//! which is unreadable inside a dependency chain. These helpers shorten
//! them, join them into chains and suggest near misses.

/// Joins a dependency path into a single line.
///
/// # Examples
/// ```
/// use gic_support::rendering::render_path;
///
/// let path = ["Vehicle", "StereoUnit", "Disc", "Vehicle"];
/// assert_eq!(render_path(&path), "Vehicle → StereoUnit → Disc → Vehicle");
/// ```
pub fn render_path(path: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push_str(" → ");
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// One line of a vertically rendered plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    /// Left column, rendered inside brackets (e.g. `Singleton`).
    pub label: String,
    /// The type being produced.
    pub type_name: String,
    /// Trailing annotation such as `cached` or `extra argument #1`.
    pub note: Option<String>,
}

impl PlanLine {
    pub fn new(label: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            type_name: type_name.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Renders plan lines top to bottom, aligned on the label column.
///
/// ```text
/// [Transient] Disc
///             ↓
/// [Transient] StereoUnit
///             ↓
/// [Root]      Vehicle
/// ```
pub fn render_plan(lines: &[PlanLine]) -> String {
    let width = lines.iter().map(|l| l.label.len()).max().unwrap_or(0);
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(&" ".repeat(width + 3));
            out.push_str("↓\n");
        }

        let label = format!("[{}]", line.label);
        out.push_str(&format!("{label:<pad$} {}", line.type_name, pad = width + 2));

        if let Some(note) = &line.note {
            out.push_str(&format!("  ({note})"));
        }
        out.push('\n');
    }

    out
}

/// Strips module paths from a type name, keeping generic structure.
///
/// ```
/// use gic_support::rendering::short_type_name;
///
/// assert_eq!(short_type_name("garage::parts::StereoUnit"), "StereoUnit");
/// assert_eq!(
///     short_type_name("alloc::sync::Arc<garage::parts::PowerSource>"),
///     "Arc<PowerSource>"
/// );
/// ```
pub fn short_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment_start = 0;

    for (idx, ch) in full_name.char_indices() {
        match ch {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                out.push_str(last_path_segment(&full_name[segment_start..idx]));
                out.push(ch);
                segment_start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    out.push_str(last_path_segment(&full_name[segment_start..]));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Suggests registered names that look like `requested`.
///
/// Candidates are ranked by how much of their short name they share with
/// the requested one; at most `limit` names are returned.
pub fn suggest_similar(requested: &str, available: &[&str], limit: usize) -> Vec<String> {
    let wanted = short_type_name(requested).to_lowercase();

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter_map(|&candidate| {
            let short = short_type_name(candidate).to_lowercase();
            if short == wanted {
                // same short name in another module
                return Some((1000, candidate));
            }
            if short.contains(&wanted) || wanted.contains(&short) {
                return Some((500 + short.len().min(wanted.len()), candidate));
            }
            let prefix = short
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (prefix >= 3).then_some((prefix * 10, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_one() {
        assert_eq!(render_path(&["Heater"]), "Heater");
    }

    #[test]
    fn empty_path() {
        let path: [&str; 0] = [];
        assert_eq!(render_path(&path), "");
    }

    #[test]
    fn short_name_plain() {
        assert_eq!(short_type_name("u32"), "u32");
    }

    #[test]
    fn short_name_nested_generics() {
        assert_eq!(
            short_type_name("std::collections::HashMap<alloc::string::String, app::Heater>"),
            "HashMap<String, Heater>"
        );
    }

    #[test]
    fn short_name_tuple_and_reference() {
        assert_eq!(short_type_name("(a::B, &c::D)"), "(B, &D)");
    }

    #[test]
    fn suggests_typo() {
        let available = ["app::Heater", "app::StereoUnit", "app::PowerSource"];
        let found = suggest_similar("app::StereoUnti", &available, 3);
        assert_eq!(found.first().map(String::as_str), Some("app::StereoUnit"));
    }

    #[test]
    fn suggests_same_name_other_module_first() {
        let available = ["app::HeaterConfig", "other::Heater"];
        let found = suggest_similar("app::Heater", &available, 1);
        assert_eq!(found, vec!["other::Heater".to_string()]);
    }

    #[test]
    fn no_suggestion_for_unrelated() {
        let available = ["app::PowerSource"];
        assert!(suggest_similar("Xyz", &available, 3).is_empty());
    }

    #[test]
    fn plan_rendering_aligns_labels() {
        let lines = vec![
            PlanLine::new("Transient", "Disc"),
            PlanLine::new("Singleton", "PowerSource").with_note("cached"),
            PlanLine::new("Root", "Vehicle"),
        ];

        let rendered = render_plan(&lines);
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows[0], "[Transient] Disc");
        assert_eq!(rows[1].trim(), "↓");
        assert_eq!(rows[2], "[Singleton] PowerSource  (cached)");
        assert_eq!(rows[4], "[Root]      Vehicle");
    }
}
