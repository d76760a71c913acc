use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub media: Media,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub query: Query,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Hosts used to derive image and video URLs.
#[derive(Debug, Deserialize)]
pub struct Media {
	/// Image host, e.g. "https://statics.example.com/images".
	pub statics_host: String,
	/// Video file host. Falls back to the stored original URL when empty.
	#[serde(default)]
	pub video_host: String,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
	pub enabled: bool,
	pub ttl_secs: u64,
	/// Optional. Serialized results larger than this are not written.
	pub max_payload_bytes: Option<u64>,
}
impl Default for Cache {
	fn default() -> Self {
		Self { enabled: false, ttl_secs: 3_600, max_payload_bytes: None }
	}
}

#[derive(Debug, Deserialize)]
pub struct Query {
	#[serde(default = "default_root_timeout_ms")]
	pub root_timeout_ms: u64,
	#[serde(default = "default_count_timeout_ms")]
	pub count_timeout_ms: u64,
	#[serde(default = "default_hydrate_timeout_ms")]
	pub hydrate_timeout_ms: u64,
	/// Partner attached to externals that have none.
	pub fallback_partner_id: Option<i32>,
}
impl Default for Query {
	fn default() -> Self {
		Self {
			root_timeout_ms: default_root_timeout_ms(),
			count_timeout_ms: default_count_timeout_ms(),
			hydrate_timeout_ms: default_hydrate_timeout_ms(),
			fallback_partner_id: None,
		}
	}
}

fn default_root_timeout_ms() -> u64 {
	10_000
}

fn default_count_timeout_ms() -> u64 {
	5_000
}

fn default_hydrate_timeout_ms() -> u64 {
	15_000
}
