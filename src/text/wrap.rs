/// One caption line and its draw origin. `y` is the text baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    /// Line text, each word followed by a single space.
    pub text: String,
    /// Horizontal origin.
    pub x: f64,
    /// Baseline.
    pub y: f64,
}

/// Break `text` into lines of at most `max_words_per_line` whitespace-separated words.
///
/// Every word is followed by one space, so emitted lines keep a trailing space. Lines advance
/// downward by `line_advance` from `origin_y`. Input with no words yields a single empty line at
/// the origin. A `max_words_per_line` of zero is treated as one.
pub fn wrap(
    text: &str,
    max_words_per_line: usize,
    origin_x: f64,
    origin_y: f64,
    line_advance: f64,
) -> Vec<WrappedLine> {
    let k = max_words_per_line.max(1);
    let mut lines = Vec::new();
    let mut buf = String::new();
    let mut y = origin_y;

    for (idx, word) in text.split_whitespace().enumerate() {
        if idx > 0 && idx % k == 0 {
            lines.push(WrappedLine {
                text: std::mem::take(&mut buf),
                x: origin_x,
                y,
            });
            y += line_advance;
        }
        buf.push_str(word);
        buf.push(' ');
    }

    lines.push(WrappedLine {
        text: buf,
        x: origin_x,
        y,
    });
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
