use penprint_core::segmenter::segment;
use proptest::prelude::*;

// Every fragment is full-sized, consecutive, and the count never exceeds the
// request.
proptest! {
    #[test]
    fn prop_fragments_are_full_and_consecutive(
        text in "\\PC{0,400}",
        count in 1usize..20,
        size in 1usize..40,
    ) {
        let fragments = segment("src", &text, count, size);
        let chars = text.chars().count();

        prop_assert!(fragments.len() <= count);
        prop_assert_eq!(fragments.len(), count.min(chars / size));

        let joined: String = fragments.iter().map(|f| f.text.as_str()).collect();
        prop_assert!(text.starts_with(&joined));

        for (i, fragment) in fragments.iter().enumerate() {
            prop_assert_eq!(fragment.index, i);
            prop_assert_eq!(fragment.text.chars().count(), size);
        }
    }
}

// Text shorter than count * size always loses at least one fragment.
proptest! {
    #[test]
    fn prop_short_text_yields_fewer_fragments(
        count in 1usize..16,
        size in 1usize..32,
        shortfall in 1usize..32,
    ) {
        let available = (count * size).saturating_sub(shortfall);
        let text = "ሀ".repeat(available);
        let fragments = segment("src", &text, count, size);

        prop_assert!(fragments.len() < count);
        prop_assert!(fragments.iter().all(|f| f.text.chars().count() == size));
    }
}
