use super::*;

fn texts(lines: &[WrappedLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn eight_words_split_six_and_two() {
    // font_size 40, padding 10
    let lines = wrap("A B C D E F G H", 6, 30.0, 120.0, 60.0);
    assert_eq!(texts(&lines), ["A B C D E F ", "G H "]);
    assert_eq!((lines[0].x, lines[0].y), (30.0, 120.0));
    assert_eq!((lines[1].x, lines[1].y), (30.0, 180.0));
}

#[test]
fn empty_and_blank_text_yield_one_empty_line() {
    for text in ["", "   ", "\n\t"] {
        let lines = wrap(text, 6, 5.0, 7.0, 10.0);
        assert_eq!(
            lines,
            vec![WrappedLine {
                text: String::new(),
                x: 5.0,
                y: 7.0
            }]
        );
    }
}

#[test]
fn exact_multiple_does_not_emit_trailing_empty_line() {
    let lines = wrap("a b c d", 2, 0.0, 0.0, 1.0);
    assert_eq!(texts(&lines), ["a b ", "c d "]);
}

#[test]
fn runs_of_whitespace_collapse() {
    let lines = wrap("  one\n\ntwo\tthree  ", 6, 0.0, 0.0, 1.0);
    assert_eq!(texts(&lines), ["one two three "]);
}

#[test]
fn zero_words_per_line_behaves_like_one() {
    let lines = wrap("x y", 0, 0.0, 0.0, 2.0);
    assert_eq!(texts(&lines), ["x ", "y "]);
    assert_eq!(lines[1].y, 2.0);
}

#[test]
fn line_count_is_ceil_n_over_k_and_words_are_preserved() {
    let words: Vec<String> = (0..23).map(|i| format!("w{i}")).collect();
    let text = words.join(" ");
    for k in 1..=9 {
        let lines = wrap(&text, k, 0.0, 0.0, 1.0);
        assert_eq!(lines.len(), words.len().div_ceil(k), "k={k}");

        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.text.split_whitespace()).collect();
        assert_eq!(rejoined, words);

        for (i, l) in lines.iter().enumerate() {
            assert_eq!(l.y, i as f64);
            assert!(l.text.ends_with(' '));
        }
    }
}
