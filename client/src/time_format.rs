/// Compact relative age for the ownership readout: "just now", "4m ago",
/// "2h ago", "3d ago".
pub fn format_age(age_secs: i64) -> String {
    let secs = age_secs.max(0);
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::format_age;

    #[test]
    fn sub_minute_is_just_now() {
        assert_eq!(format_age(0), "just now");
        assert_eq!(format_age(59), "just now");
    }

    #[test]
    fn minutes_hours_days() {
        assert_eq!(format_age(60), "1m ago");
        assert_eq!(format_age(59 * 60), "59m ago");
        assert_eq!(format_age(3_600), "1h ago");
        assert_eq!(format_age(23 * 3_600 + 59 * 60), "23h ago");
        assert_eq!(format_age(86_400), "1d ago");
        assert_eq!(format_age(40 * 86_400), "40d ago");
    }

    #[test]
    fn clamps_negative() {
        assert_eq!(format_age(-5), "just now");
    }
}
