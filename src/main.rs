//! Command-line interface for xmlschema-codec

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use xmlschema_codec::codec::{DecoderConfig, EncoderConfig};
#[cfg(feature = "cli")]
use xmlschema_codec::{
    Decoder, Encoder, JsonBridge, QName, SchemaLoader, SchemaRegistry, ShapeArena, ShapeId, ShapeResolver,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xmlschema-codec")]
#[command(author, version, about = "Schema-driven XML to JSON transcoding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the effective shape of a type or element as JSON
    Shape {
        /// XSD documents; the first one is the entry document
        #[arg(short, long = "schema", value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Type to resolve, in Clark notation ({namespace}local)
        #[arg(short = 't', long = "type", conflicts_with = "element")]
        type_name: Option<String>,

        /// Global element to resolve, in Clark notation
        #[arg(short, long)]
        element: Option<String>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Decode an XML document into JSON
    Decode {
        /// XSD documents; the first one is the entry document
        #[arg(short, long = "schema", value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Root element, in Clark notation
        #[arg(short, long)]
        element: String,

        /// XML file to decode
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a JSON document as XML
    Encode {
        /// XSD documents; the first one is the entry document
        #[arg(short, long = "schema", value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Root element, in Clark notation
        #[arg(short, long)]
        element: String,

        /// JSON file to encode
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Encoding label of the XML declaration (omitted when not given)
        #[arg(long)]
        encoding: Option<String>,

        /// Indentation width
        #[arg(long, default_value_t = 0)]
        indent: usize,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Shape {
            schemas,
            type_name,
            element,
            pretty,
        } => cmd_shape(&schemas, type_name, element, pretty),
        Commands::Decode {
            schemas,
            element,
            file,
            pretty,
            output,
        } => cmd_decode(&schemas, &element, &file, pretty, output),
        Commands::Encode {
            schemas,
            element,
            file,
            encoding,
            indent,
            output,
        } => cmd_encode(&schemas, &element, &file, encoding, indent, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Read every schema and merge them starting from the first
#[cfg(feature = "cli")]
fn load_registry(schemas: &[PathBuf]) -> CliResult<SchemaRegistry> {
    let mut loader = SchemaLoader::new();
    for path in schemas {
        let text = fs::read_to_string(path)?;
        loader.add_source(path.to_string_lossy(), &text)?;
    }
    let entry = schemas.first().ok_or("at least one schema is required")?;
    Ok(loader.load(&entry.to_string_lossy())?)
}

#[cfg(feature = "cli")]
fn shapes_json(shapes: &ShapeArena, root: ShapeId) -> CliResult<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for id in shapes.reachable(root) {
        if let Some(shape) = shapes.get(id) {
            map.insert(id.to_string(), serde_json::to_value(shape)?);
        }
    }
    Ok(serde_json::Value::Object(map))
}

#[cfg(feature = "cli")]
fn write_output(text: &str, output: Option<PathBuf>) -> CliResult<()> {
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn to_json_text(json: &serde_json::Value, pretty: bool) -> CliResult<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(json)?
    } else {
        serde_json::to_string(json)?
    })
}

#[cfg(feature = "cli")]
fn cmd_shape(schemas: &[PathBuf], type_name: Option<String>, element: Option<String>, pretty: bool) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut resolver = ShapeResolver::new(&registry);

    let json = match (type_name, element) {
        (Some(type_name), _) => {
            let name: QName = type_name.parse()?;
            let id = resolver.resolve(&name)?;
            serde_json::json!({
                "type": name.to_string(),
                "root": id,
                "shapes": shapes_json(resolver.shapes(), id)?,
            })
        }
        (None, Some(element)) => {
            let slot = resolver.resolve_element(&element.parse()?)?;
            let shapes = match slot.content {
                xmlschema_codec::shapes::SlotContent::Complex(id) => shapes_json(resolver.shapes(), id)?,
                xmlschema_codec::shapes::SlotContent::Scalar(_) => serde_json::json!({}),
            };
            serde_json::json!({
                "element": serde_json::to_value(&slot)?,
                "shapes": shapes,
            })
        }
        (None, None) => return Err("either --type or --element is required".into()),
    };

    println!("{}", to_json_text(&json, pretty)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_decode(schemas: &[PathBuf], element: &str, file: &Path, pretty: bool, output: Option<PathBuf>) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut resolver = ShapeResolver::new(&registry);
    let slot = resolver.resolve_element(&element.parse()?)?;
    let shapes = resolver.into_shapes();

    let xml = fs::read_to_string(file)?;
    let decoder = Decoder::with_config(&shapes, DecoderConfig::new().with_limits(registry.limits().clone()));
    let value = decoder.decode_element(&slot, &xml)?;
    let json = JsonBridge::new(&shapes).value_to_json(&slot, &value)?;

    write_output(&to_json_text(&json, pretty)?, output)
}

#[cfg(feature = "cli")]
fn cmd_encode(
    schemas: &[PathBuf],
    element: &str,
    file: &Path,
    encoding: Option<String>,
    indent: usize,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut resolver = ShapeResolver::new(&registry);
    let slot = resolver.resolve_element(&element.parse()?)?;
    let shapes = resolver.into_shapes();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(file)?)?;
    let value = JsonBridge::new(&shapes).value_from_json(&slot, &json)?;
    let config = EncoderConfig::new().with_encoding(encoding).with_indent(indent);
    let xml = Encoder::with_config(&shapes, config).encode_element(&slot, &value)?;

    write_output(&xml, output)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
