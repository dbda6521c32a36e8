pub const MAX_PLAYER_NAME_LENGTH: usize = 20;
pub const DEFAULT_PLAYER_NAME: &str = "Player";

pub fn sanitize_player_name(name: &str) -> String {
    let visible: String = name.chars().filter(|ch| !ch.is_control()).collect();
    let cleaned = visible.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect();
    let capped = capped.trim_end();
    if capped.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    capped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_fall_back() {
        assert_eq!(sanitize_player_name("   "), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_player_name("\u{7}"), DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn whitespace_is_collapsed_and_length_capped() {
        assert_eq!(sanitize_player_name("  Ninja \t  Cat "), "Ninja Cat");
        let long = sanitize_player_name("abcdefghij klmnopqrstuvwxyz");
        assert_eq!(long.chars().count(), MAX_PLAYER_NAME_LENGTH);
        assert_eq!(sanitize_player_name("abcdefghijklmnopqrs tuv"), "abcdefghijklmnopqrs");
    }
}
