//! Derived media URLs. Nothing here touches storage; every function is total.

use crate::content::Resized;

pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
pub const WEBP_EXTENSION: &str = "webP";
pub const ZERO_DURATION: &str = "PT0S";

/// Builds the resized URL set `{host}/{file_id}[-w{width}].{extension}`.
///
/// An empty `file_id` yields an empty set. An empty `extension` means `jpg`.
pub fn resized(host: &str, file_id: &str, extension: &str) -> Resized {
	if file_id.is_empty() {
		return Resized::default();
	}

	let host = host.trim_end_matches('/');
	let extension = if extension.is_empty() { DEFAULT_IMAGE_EXTENSION } else { extension };
	let url = |variant: Option<&str>| match variant {
		Some(variant) => format!("{host}/{file_id}-{variant}.{extension}"),
		None => format!("{host}/{file_id}.{extension}"),
	};

	Resized {
		original: url(None),
		w480: url(Some("w480")),
		w800: url(Some("w800")),
		w1200: url(Some("w1200")),
		w1600: url(Some("w1600")),
		w2400: url(Some("w2400")),
	}
}

pub fn resized_webp(host: &str, file_id: &str) -> Resized {
	resized(host, file_id, WEBP_EXTENSION)
}

/// Public URL of an uploaded video file, falling back to the stored original URL.
pub fn video_src(host: &str, file_name: Option<&str>, original_url: Option<&str>) -> String {
	let host = host.trim_end_matches('/');

	match file_name.filter(|name| !name.is_empty()) {
		Some(name) if !host.is_empty() => format!("{host}/{name}"),
		_ => original_url.unwrap_or_default().to_string(),
	}
}

/// Stored durations of `""` or `"0"` mean the duration is unknown.
pub fn duration(raw: &str) -> String {
	match raw.trim() {
		"" | "0" => ZERO_DURATION.to_string(),
		value => value.to_string(),
	}
}
