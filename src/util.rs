//! Small shared helpers for display names and score rounding

/// Capitalize the first letter of each whitespace-separated word
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("blue widgets"), "Blue Widgets");
        assert_eq!(title_case("  aws  "), "Aws");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(40.000000000000006), 40.0);
        assert_eq!(round2(119.99999), 120.0);
    }
}
