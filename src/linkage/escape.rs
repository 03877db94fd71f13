//! Selector-safe tokens for raw document names.
//!
//! Tree nodes are tagged with the raw document name as a DOM class, and
//! names like `A/B:1` contain characters with selector syntax meaning.
//! [`css_escape`] implements the CSSOM `CSS.escape` serialization so a
//! lookup built from the escaped token matches exactly the elements
//! tagged with the original name.

/// Escape an identifier for use inside a CSS selector.
pub fn css_escape(ident: &str) -> String {
	let mut out = String::with_capacity(ident.len());
	let chars: Vec<char> = ident.chars().collect();

	for (i, &c) in chars.iter().enumerate() {
		let code = c as u32;

		if code == 0 {
			out.push('\u{FFFD}');
		} else if (0x01..=0x1f).contains(&code) || code == 0x7f {
			out.push_str(&format!("\\{code:x} "));
		} else if i == 0 && c.is_ascii_digit() {
			out.push_str(&format!("\\{code:x} "));
		} else if i == 1 && c.is_ascii_digit() && chars[0] == '-' {
			out.push_str(&format!("\\{code:x} "));
		} else if i == 0 && c == '-' && chars.len() == 1 {
			out.push('\\');
			out.push(c);
		} else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
			out.push(c);
		} else {
			out.push('\\');
			out.push(c);
		}
	}

	out
}

/// Class selector matching an element tagged with `name`.
pub fn class_selector(name: &str) -> String {
	format!(".{}", css_escape(name))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selector_special_characters_are_escaped() {
		assert_eq!(css_escape("A/B:1"), "A\\/B\\:1");
		assert_eq!(css_escape("SO.2024#7"), "SO\\.2024\\#7");
	}

	#[test]
	fn ordinary_document_names_pass_through() {
		assert_eq!(css_escape("SO-0001"), "SO-0001");
		assert_eq!(css_escape("MAT-MR-2024-00003"), "MAT-MR-2024-00003");
	}

	#[test]
	fn leading_digits_follow_the_cssom_rules() {
		assert_eq!(css_escape("1st"), "\\31 st");
		assert_eq!(css_escape("-2nd"), "-\\32 nd");
		assert_eq!(css_escape("-"), "\\-");
	}

	#[test]
	fn nul_and_control_characters_are_neutralized() {
		assert_eq!(css_escape("a\u{0}b"), "a\u{FFFD}b");
		assert_eq!(css_escape("a\u{1}b"), "a\\1 b");
	}

	#[test]
	fn class_selector_prefixes_a_dot() {
		assert_eq!(class_selector("A/B:1"), ".A\\/B\\:1");
	}
}
