//! Inline text escape expansion and layout.
//!
//! DXF text values carry an escape mini-language (`%%d`, `\P`, font
//! switches) that must be resolved before layout.  Layout itself positions
//! whole lines: single TEXT entities per their alignment pair, MTEXT per a
//! 9-point attachment grid.  Glyphs are never rendered here.

use crate::geometry::TextFragment;
use crate::types::Vector3;

// horizontal alignment codes (group 72)
pub(crate) const H_LEFT: i32 = 0;
pub(crate) const H_CENTER: i32 = 1;
pub(crate) const H_RIGHT: i32 = 2;
pub(crate) const H_MIDDLE: i32 = 4;
pub(crate) const H_FIT: i32 = 5;

// vertical alignment codes (group 73)
pub(crate) const V_BASELINE: i32 = 0;
pub(crate) const V_MIDDLE: i32 = 2;

// attachment point codes (group 71)
const TOP_LEFT: i32 = 1;
const TOP_CENTER: i32 = 2;
const TOP_RIGHT: i32 = 3;
const MIDDLE_LEFT: i32 = 4;
const MIDDLE_CENTER: i32 = 5;
const MIDDLE_RIGHT: i32 = 6;
const BOTTOM_LEFT: i32 = 7;
const BOTTOM_CENTER: i32 = 8;
const BOTTOM_RIGHT: i32 = 9;

/// Escape-expanded text with the line metrics layout needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExpandedText {
    pub text: String,
    pub line_count: usize,
    pub max_line_len: usize,
}

/// Expand the inline escape mini-language.
///
/// `%%o`/`%%u` toggle overstrike/underscore (consumed), `%%d`/`%%p`/`%%c`
/// produce the degree/plus-minus/diameter symbols, `%%%` a literal percent.
/// `\P` and `\X` break lines, `\~` is a non-breaking space, and `\A`, `\f`,
/// `\F` (alignment and font switches) skip through the next `;`.
pub(crate) fn expand_control_codes(input: &str) -> ExpandedText {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut line_count = 0usize;
    let mut line_len = 0usize;
    let mut max_line_len = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c == '%' && chars.get(i + 1) == Some(&'%') {
            match chars.get(i + 2) {
                Some('o') | Some('O') | Some('u') | Some('U') => {
                    i += 3;
                }
                Some('d') | Some('D') => {
                    out.push('°');
                    line_len += 1;
                    i += 3;
                }
                Some('p') | Some('P') => {
                    out.push('±');
                    line_len += 1;
                    i += 3;
                }
                Some('c') | Some('C') => {
                    out.push('⌀');
                    line_len += 1;
                    i += 3;
                }
                Some('%') => {
                    out.push('%');
                    line_len += 1;
                    i += 3;
                }
                _ => {
                    out.push(c);
                    line_len += 1;
                    i += 1;
                }
            }
        } else if c == '\\' {
            match chars.get(i + 1) {
                Some('P') | Some('X') => {
                    out.push('\n');
                    line_count += 1;
                    max_line_len = max_line_len.max(line_len);
                    line_len = 0;
                    i += 2;
                }
                Some('A') | Some('f') | Some('F') => {
                    i += 2;
                    while i < chars.len() && chars[i] != ';' {
                        i += 1;
                    }
                    i += 1;
                }
                Some('~') => {
                    out.push(' ');
                    line_len += 1;
                    i += 2;
                }
                Some(&next) => {
                    out.push(c);
                    out.push(next);
                    line_len += 2;
                    i += 2;
                }
                None => {
                    out.push(c);
                    line_len += 1;
                    i += 1;
                }
            }
        } else {
            out.push(c);
            line_len += 1;
            i += 1;
        }
    }

    if !out.ends_with('\n') {
        line_count += 1;
    }
    max_line_len = max_line_len.max(line_len);

    ExpandedText {
        text: out,
        line_count,
        max_line_len,
    }
}

/// Layout input for a single-line TEXT/ATTRIB/ATTDEF entity.
pub(crate) struct TextLayout<'a> {
    pub text: &'a str,
    pub first: Vector3,
    pub second: Vector3,
    pub height: f64,
    pub rotation_degrees: f64,
    pub horizontal: i32,
    pub vertical: i32,
}

/// Place a TEXT entity per its alignment pair.
///
/// Returns `None` for alignment combinations the layout cannot place; the
/// caller reports those as unsupported.
pub(crate) fn layout_text(input: &TextLayout<'_>) -> Option<TextFragment> {
    let len = input.text.chars().count() as f64;
    let rot = input.rotation_degrees.to_radians();
    let (origin, height) = match (input.horizontal, input.vertical) {
        (H_FIT, V_BASELINE) => {
            // shrink to fit between the two alignment points
            let allowed = (input.first - input.second).length();
            let x_scale = if len > 0.0 { allowed / len } else { input.height };
            (input.first, x_scale.min(input.height))
        }
        (H_LEFT, V_BASELINE) => (input.first, input.height),
        (H_CENTER, V_BASELINE) | (H_MIDDLE, V_BASELINE) => {
            let width = len * input.height;
            let origin = Vector3::new(
                input.second.x - rot.cos() * width / 2.0,
                input.second.y - rot.sin() * width / 2.0,
                input.second.z,
            );
            (origin, input.height)
        }
        (H_CENTER, V_MIDDLE) | (H_MIDDLE, V_MIDDLE) => {
            let width = len * input.height;
            let mut x = input.second.x - width / 2.0;
            let mut y = input.second.y - input.height / 2.0;
            x -= (1.0 - rot.cos()) * width / 2.0;
            y -= rot.sin() * width / 2.0;
            (Vector3::new(x, y, input.second.z), input.height)
        }
        (H_RIGHT, V_BASELINE) => {
            let width = len * input.height;
            let origin = Vector3::new(
                input.second.x - rot.cos() * width,
                input.second.y - rot.sin() * width,
                input.second.z,
            );
            (origin, input.height)
        }
        _ => return None,
    };

    Some(TextFragment {
        text: input.text.to_string(),
        origin,
        height,
        rotation_degrees: input.rotation_degrees,
    })
}

/// Layout input for an MTEXT entity.
pub(crate) struct MTextLayout<'a> {
    pub expanded: &'a ExpandedText,
    pub attach_point: i32,
    pub text_height: f64,
    pub entity_height: f64,
    pub char_width: f64,
    pub rotation_degrees: f64,
    pub insertion: Vector3,
}

/// Place each line of an MTEXT entity relative to its attachment point.
pub(crate) fn layout_mtext(input: &MTextLayout<'_>) -> Vec<TextFragment> {
    let line_count = input.expanded.line_count.max(1) as f64;
    let max_len = input.expanded.max_line_len as f64;

    let scale = if input.text_height > 0.0 {
        input.text_height
    } else if input.char_width > 0.0 {
        input.char_width
    } else if input.entity_height > 0.0 {
        (input.entity_height / line_count) * 0.9
    } else {
        1.0
    };
    let line_space = 1.25 * scale;

    let rad = input.rotation_degrees.to_radians();
    let xdir = Vector3::new(rad.cos(), rad.sin(), 0.0);
    let ydir = Vector3::new(-rad.sin(), rad.cos(), 0.0);

    let (xdel, ydel) = match input.attach_point {
        TOP_LEFT => (0.0, -scale),
        TOP_CENTER => (-(max_len * scale) / 2.0, -scale),
        TOP_RIGHT => (-(max_len * scale), -scale),
        MIDDLE_LEFT => (0.0, -(line_count * line_space) / 2.0),
        MIDDLE_CENTER => (-(max_len * scale) / 2.0, -(line_count * line_space) / 2.0),
        MIDDLE_RIGHT => (-(max_len * scale), -(line_count * line_space) / 2.0),
        BOTTOM_LEFT => (0.0, line_count * line_space - scale),
        BOTTOM_CENTER => (-(max_len * scale) / 2.0, line_count * line_space - scale),
        BOTTOM_RIGHT => (-(max_len * scale), line_count * line_space - scale),
        _ => (0.0, 0.0),
    };

    let mut start = input.insertion + xdir * xdel + ydir * ydel;
    let mut fragments = Vec::new();
    let mut lines: Vec<&str> = input.expanded.text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    for line in lines {
        fragments.push(TextFragment {
            text: line.to_string(),
            origin: Vector3::new(start.x, start.y, input.insertion.z),
            height: scale,
            rotation_degrees: input.rotation_degrees,
        });
        start = start - ydir * line_space;
    }
    fragments
}
