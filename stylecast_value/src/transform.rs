// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform argument scanner.

/// Extracts the argument text of a named function call from a CSS
/// `transform` value.
///
/// Scans for the first occurrence of `function_name`, then forward to the
/// next `(`, and captures up to the next `)`. The capture is returned
/// verbatim, units and commas included. Returns the empty string when the
/// name does not occur or the parentheses never close.
///
/// This is a single-level scanner: nested function calls inside the
/// argument are not handled, matching the flat transform-function grammar
/// it is used on. The name matches by substring, so `scale` also finds
/// the `scale` inside `scaleX`.
///
/// # Example
///
/// ```
/// use stylecast_value::parse_transform;
///
/// let t = "translateX(10px) rotateY(5deg)";
/// assert_eq!(parse_transform("translateX", t), "10px");
/// assert_eq!(parse_transform("rotateY", t), "5deg");
/// assert_eq!(parse_transform("scale", t), "");
/// ```
#[must_use]
pub fn parse_transform<'a>(function_name: &str, transform_text: &'a str) -> &'a str {
    let Some(index) = transform_text.find(function_name) else {
        return "";
    };
    let after_name = &transform_text[index + function_name.len()..];
    let Some(open) = after_name.find('(') else {
        return "";
    };
    let after_open = &after_name[open + 1..];
    let Some(close) = after_open.find(')') else {
        return "";
    };
    &after_open[..close]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_named_argument() {
        let t = "translateX(10px) rotateY(5deg) scale(1.5)";
        assert_eq!(parse_transform("translateX", t), "10px");
        assert_eq!(parse_transform("rotateY", t), "5deg");
        assert_eq!(parse_transform("scale", t), "1.5");
    }

    #[test]
    fn absent_name_yields_empty() {
        assert_eq!(parse_transform("scale", "translateX(10px)"), "");
        assert_eq!(parse_transform("rotate", ""), "");
    }

    #[test]
    fn multi_argument_capture_is_verbatim() {
        assert_eq!(
            parse_transform("translate", "translate(10px, 20%)"),
            "10px, 20%"
        );
    }

    #[test]
    fn substring_name_matches_first_occurrence() {
        // `scale` finds `scaleX` first and captures its argument.
        assert_eq!(parse_transform("scale", "scaleX(2) scale(3)"), "2");
    }

    #[test]
    fn malformed_input_yields_empty() {
        assert_eq!(parse_transform("rotate", "rotate"), "");
        assert_eq!(parse_transform("rotate", "rotate(45deg"), "");
    }

    #[test]
    fn first_occurrence_wins() {
        assert_eq!(
            parse_transform("rotate", "rotate(1deg) rotate(2deg)"),
            "1deg"
        );
    }
}
