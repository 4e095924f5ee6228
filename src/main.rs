use clap::Parser;
use mapstyle::{CompileError, FeatureProperties, Layer, RenderContext, Renderer, RendererOptions};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Compiles a map stylesheet and prints a JSON summary of its layers.
#[derive(Parser, Debug)]
#[command(name = "mapstyle", version, about, long_about = None)]
struct Args {
    /// Path to the stylesheet (.mss / .css)
    style: PathBuf,

    /// JSON object of feature properties to evaluate every layer against
    #[arg(long)]
    data: Option<PathBuf>,

    /// Zoom level used for evaluation
    #[arg(long, default_value_t = 0)]
    zoom: u32,

    /// Animation frame offset used for evaluation
    #[arg(long = "frame-offset", default_value_t = 0, allow_hyphen_values = true)]
    frame_offset: i64,

    /// Log compiled layers and fragments
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Reject properties missing from the reference table
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Give up on extension functions after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// JSON file with renderer options; flags override it
    #[arg(long)]
    options: Option<PathBuf>,
}

fn layer_summary(layer: &Layer, props: &FeatureProperties, ctx: &RenderContext) -> Value {
    json!({
        "name": layer.full_name(),
        "attachment": layer.attachment(),
        "symbolizers": layer.get_symbolizers(),
        "frames": layer.frames(),
        "zoom": layer.zoom().levels().collect::<Vec<_>>(),
        "variable": layer.is_variable(),
        "filtered": layer.is_filtered(),
        "style": layer.get_style(props, ctx),
    })
}

fn load_properties(path: &PathBuf) -> Result<FeatureProperties, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object in {}, found {}", path.display(), other).into()),
    }
}

async fn run(args: Args) -> Result<Value, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&args.style)?;
    let props = match &args.data {
        Some(path) => load_properties(path)?,
        None => FeatureProperties::new(),
    };

    let mut options = match &args.options {
        Some(path) => serde_json::from_str::<RendererOptions>(&fs::read_to_string(path)?)?,
        None => RendererOptions::new(),
    };
    options.debug |= args.debug;
    options.strict_properties |= args.strict;
    if let Some(ms) = args.timeout_ms {
        options = options.with_extension_timeout(Duration::from_millis(ms));
    }

    let renderer = Renderer::new(options);
    let stylesheet = renderer.render(&source).await?;

    let ctx = RenderContext::new(args.zoom, args.frame_offset);
    let layers: Vec<Value> = stylesheet
        .get_layers()
        .iter()
        .map(|layer| layer_summary(layer, &props, &ctx))
        .collect();
    Ok(json!({
        "layers": layers,
        "imageUrls": stylesheet.get_image_urls(),
        "map": stylesheet.map_properties(),
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(args).await {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            match e.downcast_ref::<CompileError>() {
                Some(compile_error) => {
                    for message in compile_error.messages() {
                        eprintln!("error: {}", message);
                    }
                }
                None => eprintln!("error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}
