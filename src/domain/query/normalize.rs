/// Trims `raw` and maps blank input to `None`.
///
/// Every optional text parameter that is subject to blank-means-absent goes through here.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
