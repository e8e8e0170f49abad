/// Strip markdown markers that read badly when spoken and collapse
/// whitespace.
pub fn sanitize_for_speech(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '#' | '`'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
