use std::env;
use std::error::Error;
use std::process;

use graphql_typegen::ast::document::Document;
use graphql_typegen::config::{config_json_schema, TypegenConfig};
use graphql_typegen::resolvers::ResolverBuilder;
use graphql_typegen::shape::{materialize, MaterializeContext};
use graphql_typegen::utils::pretty_display::PrettyDisplay;
use graphql_typegen::{parse_document, parse_schema, project_documents};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Args {
    command: String,
    schema_path: Option<String>,
    document_paths: Vec<String>,
    config_path: Option<String>,
    json: bool,
    materialize: bool,
}

fn main() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();

    let Some(args) = parse_args() else {
        eprintln!(
            "Usage: typegen-dev-cli <command> [schema_path] [document_path...] [--config <path>] [--json] [--materialize]"
        );
        process::exit(1);
    };

    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn parse_args() -> Option<Args> {
    let mut raw = env::args().skip(1);
    let command = raw.next()?;
    let mut args = Args {
        command,
        schema_path: None,
        document_paths: vec![],
        config_path: None,
        json: false,
        materialize: false,
    };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--materialize" => args.materialize = true,
            "--config" => args.config_path = Some(raw.next()?),
            _ if args.schema_path.is_none() => args.schema_path = Some(arg),
            _ => args.document_paths.push(arg),
        }
    }

    Some(args)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    if args.command == "config-schema" {
        println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
        return Ok(());
    }

    if args.command == "print" {
        let paths: Vec<String> = args
            .schema_path
            .iter()
            .chain(args.document_paths.iter())
            .cloned()
            .collect();
        for document in load_documents(&paths)? {
            print!("{}", document.pretty());
        }
        return Ok(());
    }

    let schema_path = args.schema_path.as_deref().ok_or("missing schema path")?;
    let schema = parse_schema(&std::fs::read_to_string(schema_path)?)?;
    let config = match &args.config_path {
        Some(path) => serde_json::from_str::<TypegenConfig>(&std::fs::read_to_string(path)?)?,
        None => TypegenConfig::default(),
    };
    let config = config.resolve(&schema)?;

    match args.command.as_str() {
        "resolvers" => {
            let maps = ResolverBuilder::new(&schema, &config).project_all()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&maps)?);
                return Ok(());
            }

            for map in maps {
                println!("{}:", map.output_name);
                for (field_name, signature) in &map.fields {
                    println!("  {}: {}", field_name, signature.result);
                }
                if let Some(resolve_type) = &map.resolve_type {
                    println!("  __resolveType: {}", resolve_type.possible_types.join(" | "));
                }
            }
        }
        "operations" | "fragments" => {
            let documents = load_documents(&args.document_paths)?;
            let projected = project_documents(&schema, &documents, &config)?;
            let context = MaterializeContext {
                schema: &schema,
                config: &config,
                fragments: &projected,
            };

            if args.command == "fragments" {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&projected.fragments)?);
                    return Ok(());
                }

                for fragment in projected.fragments.values() {
                    let shape = match args.materialize {
                        true => materialize(&fragment.shape, &context)?,
                        false => fragment.shape.clone(),
                    };
                    println!("{} = {}", fragment.output_name, shape);
                }
                return Ok(());
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&projected.operations)?);
                return Ok(());
            }

            for operation in &projected.operations {
                let result_type = match args.materialize {
                    true => materialize(&operation.result_type, &context)?,
                    false => operation.result_type.clone(),
                };
                println!("{} = {}", operation.result_type_name, result_type);
                println!(
                    "{} = {}",
                    operation.variables_type_name, operation.variables_type
                );
            }
        }
        _ => {
            eprintln!(
                "Unknown command. Available commands: operations, fragments, resolvers, print, config-schema"
            );
            process::exit(1);
        }
    }

    Ok(())
}

fn load_documents(paths: &[String]) -> Result<Vec<Document>, Box<dyn Error>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        debug!(path = path.as_str(), "loading document");
        documents.push(parse_document(&std::fs::read_to_string(path)?)?);
    }

    Ok(documents)
}
