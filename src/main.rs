use std::env;

use log::*;
use warp::filters::log::Info;
use warp::Filter;

use bank_service::db;

#[tokio::main]
async fn main() {
	if env::var_os("RUST_LOG").is_none() {
		env::set_var("RUST_LOG", "info");
	}
	pretty_env_logger::init();

	let _pool = db::pg_connection();
	info!(target: "bank::api", "database pool ready");

	let log = warp::log::custom(|info: Info| {
		info!(
			target: "bank::api",
			"\"{} {} {:?}\" {} {:?}",
			info.method(),
			info.path(),
			info.version(),
			info.status().as_u16(),
			info.elapsed(),
		);
	});

	// routing lives in the api layer; this binary only exposes liveness
	let health = warp::path("health").map(|| "ok").with(log);
	warp::serve(health).run(([127, 0, 0, 1], 3030)).await;
}
