use web_sys::Storage;

use crate::js_value_to_string;

pub const HIGH_SCORE_KEY: &str = "highScore";

/// Parses a stored high score. Anything that is not a non-negative integer
/// reads as 0; a float-looking value keeps its integer prefix.
pub fn parse_high_score(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };
    let digits: &str = {
        let trimmed = raw.trim();
        let end = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse().unwrap_or(0)
}

fn local_storage() -> Result<Storage, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    window
        .local_storage()
        .map_err(|err| js_value_to_string(&err))?
        .ok_or_else(|| "localStorage unavailable".to_string())
}

pub fn load_high_score() -> Result<u32, String> {
    let storage = local_storage()?;
    let raw = storage
        .get_item(HIGH_SCORE_KEY)
        .map_err(|err| js_value_to_string(&err))?;
    Ok(parse_high_score(raw.as_deref()))
}

pub fn save_high_score(high_score: u32) -> Result<(), String> {
    local_storage()?
        .set_item(HIGH_SCORE_KEY, &high_score.to_string())
        .map_err(|err| js_value_to_string(&err))
}
