//! Embeddable host patterns
//!
//! A pattern is a host with an optional scheme, port and path prefix, e.g.
//! `eviltrout.com`, `http://discourse.org` or `https://example.com/1234`.
//! The scheme is ignored when matching, the host is compared without regard
//! to case, and a path prefix has to match whole path segments.

use url::Url;

use forumgate_types::meta_adapter::EmbeddableHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern {
	/// Lowercase host, with `:port` if one was given
	host: Box<str>,
	/// Without trailing slash, `None` for the whole host
	path_prefix: Option<Box<str>>,
}

impl HostPattern {
	pub fn parse(pattern: &str) -> Option<Self> {
		let pattern = pattern.trim();
		let rest = pattern.split_once("://").map_or(pattern, |(_, rest)| rest);
		let (host, path) = match rest.find('/') {
			Some(pos) => rest.split_at(pos),
			None => (rest, ""),
		};
		if host.is_empty() {
			return None;
		}

		let path = path.trim_end_matches('/');
		Some(Self {
			host: host.to_ascii_lowercase().into(),
			path_prefix: (!path.is_empty()).then(|| path.into()),
		})
	}

	pub fn matches(&self, referrer: &Referrer) -> bool {
		if *self.host != *referrer.host {
			return false;
		}
		match &self.path_prefix {
			None => true,
			Some(prefix) => match referrer.path.strip_prefix(&**prefix) {
				Some(rest) => rest.is_empty() || rest.starts_with('/'),
				None => false,
			},
		}
	}
}

/// The parts of a `Referer` header that take part in matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referrer {
	host: Box<str>,
	path: Box<str>,
}

impl Referrer {
	pub fn parse(referrer: &str) -> Option<Self> {
		let url = Url::parse(referrer.trim()).ok()?;
		let host = url.host_str()?;
		// port() is None for the scheme's default port
		let host = match url.port() {
			Some(port) => format!("{host}:{port}"),
			None => host.to_string(),
		};

		Some(Self { host: host.to_ascii_lowercase().into(), path: url.path().into() })
	}
}

/// First registered host matching the referrer
pub fn find_host<'a>(
	hosts: &'a [EmbeddableHost],
	referrer: &Referrer,
) -> Option<&'a EmbeddableHost> {
	hosts.iter().find(|host| HostPattern::parse(&host.host).is_some_and(|p| p.matches(referrer)))
}

/// Ready-to-embed ` class="NAME"` attribute, or `None` without a class name
pub fn class_attr(class_name: Option<&str>) -> Option<Box<str>> {
	class_name
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(|name| format!(" class=\"{}\"", handlebars::html_escape(name)).into())
}


// vim: ts=4
