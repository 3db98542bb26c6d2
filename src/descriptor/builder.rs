// self
use crate::{
	_prelude::*,
	auth::CredentialKeys,
	descriptor::{ApiDescriptor, AuthRoutes},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DescriptorError {
	/// Base URL cannot have routes joined onto it (e.g. `mailto:`).
	#[error("Base URL cannot act as a base: {url}.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Only HTTP(S) APIs are supported.
	#[error("Base URL uses unsupported scheme `{scheme}`.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Plain HTTP is limited to loopback hosts unless explicitly allowed.
	#[error("Base URL must use HTTPS for non-loopback hosts: {url}.")]
	InsecureBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// A route could not be joined onto the base URL.
	#[error("Route `{route}` cannot be resolved against the base URL.")]
	InvalidRoute {
		/// Offending route.
		route: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Credential store keys must be non-empty and distinct.
	#[error("Credential store keys must be non-empty and distinct.")]
	InvalidCredentialKeys,
}

/// Builder for [`ApiDescriptor`] values.
#[derive(Debug)]
pub struct ApiDescriptorBuilder {
	/// Base URL of the API.
	pub base_url: Url,
	/// Auth endpoint routes.
	pub routes: AuthRoutes,
	/// Store keys for the session credentials.
	pub keys: CredentialKeys,
	/// Routes sent without a credential, besides the auth routes.
	pub exempt_routes: Vec<String>,
	/// Whether login and registration routes are exempt.
	pub exempt_auth_routes: bool,
	/// Accept plain HTTP for any host.
	pub allow_insecure: bool,
}
impl ApiDescriptorBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			routes: AuthRoutes::default(),
			keys: CredentialKeys::default(),
			exempt_routes: Vec::new(),
			exempt_auth_routes: true,
			allow_insecure: false,
		}
	}

	/// Overrides the login route.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.routes.login = route.into();

		self
	}

	/// Overrides the registration route.
	pub fn register_route(mut self, route: impl Into<String>) -> Self {
		self.routes.register = route.into();

		self
	}

	/// Overrides the refresh route.
	pub fn refresh_route(mut self, route: impl Into<String>) -> Self {
		self.routes.refresh = route.into();

		self
	}

	/// Overrides the profile route.
	pub fn me_route(mut self, route: impl Into<String>) -> Self {
		self.routes.me = route.into();

		self
	}

	/// Replaces every auth route at once.
	pub fn routes(mut self, routes: AuthRoutes) -> Self {
		self.routes = routes;

		self
	}

	/// Overrides the store keys.
	pub fn credential_keys(mut self, keys: CredentialKeys) -> Self {
		self.keys = keys;

		self
	}

	/// Sends `route` without a credential.
	pub fn exempt_route(mut self, route: impl Into<String>) -> Self {
		self.exempt_routes.push(route.into());

		self
	}

	/// Attaches credentials to login and registration calls as well.
	pub fn attach_to_auth_routes(mut self) -> Self {
		self.exempt_auth_routes = false;

		self
	}

	/// Accepts plain HTTP base URLs on any host.
	pub fn allow_insecure(mut self) -> Self {
		self.allow_insecure = true;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ApiDescriptor, DescriptorError> {
		let base_url = normalize_base(self.base_url);

		validate_base(&base_url, self.allow_insecure)?;
		validate_keys(&self.keys)?;

		let mut descriptor = ApiDescriptor {
			base_url,
			routes: self.routes,
			keys: self.keys,
			exempt_paths: Vec::new(),
		};

		// Resolving every route up front surfaces bad routes at build time.
		descriptor.refresh_url()?;
		descriptor.me_url()?;

		let mut exempt = Vec::new();

		if self.exempt_auth_routes {
			exempt.push(descriptor.login_url()?.path().to_owned());
			exempt.push(descriptor.register_url()?.path().to_owned());
		} else {
			descriptor.login_url()?;
			descriptor.register_url()?;
		}

		for route in &self.exempt_routes {
			exempt.push(descriptor.endpoint(route)?.path().to_owned());
		}

		descriptor.exempt_paths = exempt;

		Ok(descriptor)
	}
}

fn normalize_base(mut url: Url) -> Url {
	if !url.cannot_be_a_base() && !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	url
}

fn validate_base(url: &Url, allow_insecure: bool) -> Result<(), DescriptorError> {
	if url.cannot_be_a_base() {
		return Err(DescriptorError::CannotBeABase { url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(()),
		"http" if allow_insecure || is_loopback(url) => Ok(()),
		"http" => Err(DescriptorError::InsecureBaseUrl { url: url.to_string() }),
		scheme => Err(DescriptorError::UnsupportedScheme { scheme: scheme.to_owned() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn validate_keys(keys: &CredentialKeys) -> Result<(), DescriptorError> {
	if keys.access.is_empty() || keys.refresh.is_empty() || keys.access == keys.refresh {
		Err(DescriptorError::InvalidCredentialKeys)
	} else {
		Ok(())
	}
}
