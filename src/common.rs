use serde_json::Value;

pub const FORMAT_STR: &str = "%Y-%m-%d-%H:%M";
pub const EMAIL_REGEX_PATTERN: &str = r#"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"#;

// Indentation used for everything printed under a step header
const INDENT: &str = "   ";

pub fn error_line(s: &str) {
    println!("\x1b[1;31mERROR: \x1b[0m{}", s); // Red and Bold ERROR
}

pub fn success(s: &str) {
    println!("\x1b[1;32mSuccess! \x1b[0m{}", s)
}

pub fn str_of_date_local(d: chrono::DateTime<chrono::Local>) -> String {
    d.format(FORMAT_STR).to_string()
}

pub fn step_header(number: u8, title: &str) {
    println!("{}. {}", number, title);
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}{}: {}", INDENT, label, value);
}

pub fn step_end() {
    println!();
}

/// Compact single-line rendering of a JSON reply.
pub fn render_json(v: &Value) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| v.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;

    #[test]
    fn date_format() {
        let d = chrono::Local
            .with_ymd_and_hms(1989, 6, 4, 7, 5, 0)
            .single()
            .unwrap();
        assert_eq!(str_of_date_local(d), "1989-06-04-07:05");
    }

    #[test]
    fn email_pattern() {
        let re = Regex::new(EMAIL_REGEX_PATTERN).unwrap();
        assert!(re.is_match("test1@example.com"));
        assert!(re.is_match("test1+ab12cd34@example.com"));
        assert!(!re.is_match("not an email"));
        assert!(!re.is_match("x test1@example.com"));
    }
}
