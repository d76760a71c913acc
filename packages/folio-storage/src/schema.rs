//! Tables owned by this workspace. Content tables are managed by the CMS and never created here.

pub fn render_schema() -> String {
	expand_includes(include_str!("../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			if path.trim() == "tables/001_query_cache.sql" {
				out.push_str(include_str!("../sql/tables/001_query_cache.sql"));
			}

			out.push('\n');

			continue;
		}

		out.push_str(line);
		out.push('\n');
	}

	out
}
