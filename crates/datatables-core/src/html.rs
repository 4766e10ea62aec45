//! HTML helpers used by the default cell display.

use std::borrow::Cow;

/// Entity-encodes cell text for the HTML body of a table cell
///
/// Ampersands, angle brackets and both quote characters become named or
/// numeric entities, the single quote as `&#039;` so output matches
/// `htmlentities` with `ENT_QUOTES`. Text without any of them is returned
/// borrowed.
///
/// # Examples
///
/// ```
/// use datatables_core::html::escape;
///
/// assert_eq!(escape("Hello"), "Hello");
/// assert_eq!(escape("<b>Tom & 'Jerry'</b>"),
///            "&lt;b&gt;Tom &amp; &#039;Jerry&#039;&lt;/b&gt;");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
	let Some(first) = text.find(|c: char| entity(c).is_some()) else {
		return Cow::Borrowed(text);
	};

	let mut encoded = String::with_capacity(text.len() + 16);
	encoded.push_str(&text[..first]);
	for c in text[first..].chars() {
		match entity(c) {
			Some(replacement) => encoded.push_str(replacement),
			None => encoded.push(c),
		}
	}
	Cow::Owned(encoded)
}

fn entity(c: char) -> Option<&'static str> {
	match c {
		'&' => Some("&amp;"),
		'<' => Some("&lt;"),
		'>' => Some("&gt;"),
		'"' => Some("&quot;"),
		'\'' => Some("&#039;"),
		_ => None,
	}
}

/// Wraps already-escaped text in an anchor pointing at `url`.
///
/// The URL is escaped for use inside the `href` attribute.
pub fn anchor(url: &str, escaped_text: &str) -> String {
	format!("<a href=\"{}\">{}</a>", escape(url), escaped_text)
}
