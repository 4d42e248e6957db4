use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use md_chain_core::io::{list_files, normalize_folder, read_text};
use md_chain_core::model::{GenerateParams, Generator, Order, SeedSpec, TransitionTable};
use md_chain_core::text::tokenize;

/// Folder holding the `.md` corpora, relative to the working directory.
const DATA_FOLDER: &str = "./data";

/// Largest `length` a single request may ask for.
const MAX_LENGTH: usize = 10_000;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateQuery {
	length: Option<usize>,
	seed: Option<String> // none, text:<raw> or tokens:<a>,<b>
}

impl GenerateQuery {
	/// Builds generation parameters, rejecting lengths above `MAX_LENGTH`.
	fn params(&self) -> Result<GenerateParams, String> {
		let length = self.length.unwrap_or(GenerateParams::DEFAULT_LENGTH);
		if length > MAX_LENGTH {
			return Err(format!("Length must be <= {MAX_LENGTH}, got {length}."));
		}
		let seed = match &self.seed {
			Some(s) => SeedSpec::parse(s).map_err(|e| e.to_string())?,
			None => SeedSpec::Absent,
		};
		Ok(GenerateParams::new(length, seed))
	}
}

#[derive(Deserialize)]
struct LoadQuery {
	name: Option<String>,
	order: Option<usize>
}

/// Server state. The table is replaced wholesale on load and only read by
/// generation, so concurrent requests share it behind a read lock.
struct SharedData {
	folder: String,
	table: RwLock<Option<TransitionTable>>
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates text from the loaded table based on query parameters.
///
/// # Responses
/// - 200 with the generated text
/// - 400 with the error message for a bad seed, bad or oversized length, or empty chain
/// - 409 if no corpus is loaded
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateQuery>) -> impl Responder {
	let params = match query.params() {
		Ok(p) => p,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};

	let table = match data.table.read() {
		Ok(t) => t,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let table = match table.as_ref() {
		Some(t) => t,
		None => return HttpResponse::Conflict().body("No corpus loaded"),
	};

	match Generator::new(table).generate(&params, &mut rand::rng()) {
		Ok(generation) => {
			if generation.stopped_early() {
				log::debug!("generation stopped early at {} words", generation.tokens.len());
			}
			HttpResponse::Ok().body(generation.text())
		}
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<SharedData>) -> impl Responder {
	match list_files(normalize_folder(&data.folder), "md") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(e) => {
			log::error!("failed to list corpora: {e}");
			HttpResponse::InternalServerError().body("Failed to list corpora")
		}
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	let table = match data.table.read() {
		Ok(t) => t,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match table.as_ref() {
		Some(t) => HttpResponse::Ok().json(t.stats()),
		None => HttpResponse::Conflict().body("No corpus loaded"),
	}
}

/// HTTP PUT endpoint `/v1/load`
///
/// Reads `<data folder>/<name>.md`, builds a table of the requested order
/// and replaces the loaded one.
#[put("/v1/load")]
async fn put_load(data: web::Data<SharedData>, query: web::Query<LoadQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};
	if name.contains(['/', '\\']) || name.starts_with('.') {
		return HttpResponse::BadRequest().body("Invalid corpus name");
	}

	let order = match query.order.map(Order::new).transpose() {
		Ok(order) => order.unwrap_or_default(),
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let path = normalize_folder(&data.folder).join(format!("{name}.md"));
	let content = match read_text(&path) {
		Ok(c) => c,
		Err(e) => {
			log::warn!("{e}");
			return HttpResponse::NotFound().body(format!("Failed to load corpus: {e}"))
		}
	};

	let table = TransitionTable::build(&tokenize(&content), order);
	let stats = table.stats();
	log::info!("loaded '{}': {} states, order {}", name, stats.states, order);

	let mut shared = match data.table.write() {
		Ok(t) => t,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	*shared = Some(table);

	HttpResponse::Ok().json(stats)
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_corpora)
		.service(get_stats)
		.service(put_load);
}

/// Main entry point for the server.
///
/// Starts with no corpus loaded; clients call `/v1/load` first.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpora are read from `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let shared_data = web::Data::new(SharedData {
		folder: DATA_FOLDER.to_owned(),
		table: RwLock::new(None),
	});

	log::info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(configure)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
