use crate::models::Fragment;

/// Splits `text` into consecutive fragments of exactly `fragment_size`
/// characters, starting at the beginning of the text.
///
/// At most `fragment_count` fragments are produced. A fragment that would run
/// past the end of the text is dropped, so short input yields fewer fragments
/// instead of padded or partial ones.
pub fn segment(
    source: &str,
    text: &str,
    fragment_count: usize,
    fragment_size: usize,
) -> Vec<Fragment> {
    if fragment_count == 0 || fragment_size == 0 {
        return Vec::new();
    }

    // Char boundaries plus the end of the text.
    let mut boundaries = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()));
    let mut start = boundaries.next().unwrap_or(0);

    let mut fragments = Vec::with_capacity(fragment_count.min(text.len() / fragment_size + 1));
    for index in 0..fragment_count {
        let Some(end) = boundaries.nth(fragment_size - 1) else {
            break;
        };
        fragments.push(Fragment {
            source: source.to_string(),
            index,
            text: text[start..end].to_string(),
        });
        start = end;
    }

    fragments
}
