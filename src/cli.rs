use crate::collection::Collection;
use crate::config::QueryConfig;
use crate::database::Database;
use crate::errors::DbError;
use crate::query::{self, FindOptions, QueryCompiler, SortSpecifier};
use crate::store::{MemoryStore, Store};
use crate::utils::json::{bson_document_to_json_line, parse_json_to_bson_document};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

const CLI_DATABASE: &str = "cli";

pub enum Command {
    // Query an NDJSON file
    Find {
        file: PathBuf,
        filter_json: String,
        sort: Option<String>,
        skip: Option<usize>,
        limit: Option<usize>,
    },
    Count { file: PathBuf, filter_json: String },
    // Show how a filter is parsed and compiled
    Compile { filter_json: String },
}

/// Insert one document per non-blank line. Returns the number of documents read.
///
/// # Errors
/// Returns `InvalidDocument` naming the first line that is not a JSON object, and
/// `DuplicateKey` when two lines share an `_id`.
pub fn load_ndjson<S: Store, R: Read>(
    collection: &Collection<S>,
    reader: R,
) -> Result<usize, DbError> {
    let mut reader = BufReader::new(reader);
    let mut docs = Vec::new();
    let mut line_no: usize = 0;
    let mut buf = String::with_capacity(8 * 1024);
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        let doc = parse_json_to_bson_document(line)
            .map_err(|e| DbError::InvalidDocument(format!("line {line_no}: {e}")))?;
        docs.push(doc);
    }
    let inserted = collection.insert_many(docs)?.eids.len();
    log::info!("loaded {inserted} documents into {}", collection.name());
    Ok(inserted)
}

fn open_collection(file: &Path, config: &QueryConfig) -> Result<Collection<MemoryStore>, DbError> {
    let db = Database::with_config(CLI_DATABASE, config.clone())?;
    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("documents");
    let col = db.collection(name)?;
    load_ndjson(&col, File::open(file)?)?;
    Ok(col)
}

/// Execute a command, writing its output to `out`.
///
/// # Errors
/// Returns I/O, JSON, compile and sort-specification errors.
pub fn run<W: Write>(
    cmd: Command,
    config: &QueryConfig,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Find { file, filter_json, sort, skip, limit } => {
            let filter = parse_json_to_bson_document(&filter_json)?;
            let sort = sort.as_deref().map(SortSpecifier::parse_arg).transpose()?;
            let opts = FindOptions { sort, skip, limit };
            let col = open_collection(&file, config)?;
            // Stream as NDJSON
            for doc in col.find(Some(&filter), &opts)? {
                writeln!(out, "{}", bson_document_to_json_line(&doc)?)?;
            }
            Ok(())
        }
        Command::Count { file, filter_json } => {
            let filter = parse_json_to_bson_document(&filter_json)?;
            let col = open_collection(&file, config)?;
            writeln!(out, "{}", col.count(Some(&filter))?)?;
            Ok(())
        }
        Command::Compile { filter_json } => {
            let filter = parse_json_to_bson_document(&filter_json)?;
            let tree = query::parse_filter_json(&filter_json)?;
            let store = MemoryStore::with_config(config);
            let predicate =
                QueryCompiler::new(&store).with_config(config.clone()).compile(Some(&filter))?;
            writeln!(out, "tree: {tree}")?;
            writeln!(out, "predicate: {predicate}")?;
            Ok(())
        }
    }
}
