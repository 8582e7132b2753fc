use super::*;

/// Eight units per character, sixteen per line
fn monospace(text: &str) -> TextSize {
    TextSize::new(text.chars().count() as f64 * 8.0, 16.0)
}

fn wrap(text: &str, chars: usize) -> LineWrap {
    wrap_line(text, chars as f64 * 8.0, &mut WidthCache::new(), monospace)
}

#[test]
fn test_segments_keep_trailing_space() {
    assert_eq!(
        segments("one two  three"),
        vec![(0, "one "), (4, "two  "), (9, "three")]
    );
    assert_eq!(segments("  indented word"), vec![(0, "  indented "), (11, "word")]);
    assert_eq!(segments("   "), vec![(0, "   ")]);
    assert!(segments("").is_empty());
}

#[test]
fn test_short_line_has_no_breaks() {
    let line = wrap("one two", 10);
    assert!(line.breaks.is_empty());
    assert_eq!(line.rows(), 1);
    assert_eq!(line.width, 56.0);
}

#[test]
fn test_breaks_before_overflowing_word() {
    let line = wrap("one two three four", 10);
    assert_eq!(line.breaks, vec![8]);
    assert_eq!(line.width, 80.0);
}

#[test]
fn test_long_word_gets_its_own_row() {
    let line = wrap("a verylongword b", 6);
    assert_eq!(line.breaks, vec![2, 15]);
    assert_eq!(line.rows(), 3);
    assert_eq!(line.width, 13.0 * 8.0);
}

#[test]
fn test_measurements_are_cached() {
    let mut widths = WidthCache::new();
    let mut calls = 0;
    wrap_line("ab ab ab", 100.0, &mut widths, |t| {
        calls += 1;
        monospace(t)
    });
    // "ab " and "ab"
    assert_eq!(calls, 2);
}

#[test]
fn test_map_follows_edits() {
    let mut store = LineStore::from_text("one two three four\nab");
    let mut widths = WidthCache::new();
    let mut map = WrapMap::new();
    assert!(!map.is_enabled());
    assert!(map.breaks(0).is_empty());

    map.rewrap_all(80.0, &store, &mut widths, monospace);
    assert_eq!(map.width(), Some(80.0));
    assert_eq!(map.breaks(0), &[8]);
    assert_eq!(map.visual_rows(), 3);
    assert_eq!(map.widest(), 80.0);

    // A new first line shifts everything down
    store.set_caret(crate::lines::Position::new(0, 0), false);
    let range = store.insert_str("x y z w v u\n").unwrap();
    map.update(&store, range, &mut widths, monospace);
    assert_eq!(map.breaks(0), &[10]);
    assert_eq!(map.breaks(1), &[8]);
    assert!(map.breaks(2).is_empty());
    assert_eq!(map.visual_rows(), 5);

    map.disable();
    assert!(!map.is_enabled());
    assert_eq!(map.visual_rows(), 0);
    map.update(&store, LineRange::ALL, &mut widths, monospace);
    assert!(map.breaks(0).is_empty());
}
