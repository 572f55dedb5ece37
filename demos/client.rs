use argh::FromArgs;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::path::PathBuf;
use watson_infernum::{messages::InferRequestBody, server::INFER_ROUTE};

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs)]
/// Client posting images to a running Watson proxy
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "analyze" or "navigate"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Analyze(AnalyzeCommand),
    Navigate(NavigateCommand),
}

#[derive(FromArgs)]
/// Describe the scene in an image
#[argh(subcommand, name = "analyze")]
struct AnalyzeCommand {
    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,
}

#[derive(FromArgs)]
/// Turn a navigation instruction into guidance for an image
#[argh(subcommand, name = "navigate")]
struct NavigateCommand {
    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// the navigation instruction
    #[argh(option, short = 'n')]
    instruction: String,
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

fn encode_image(path: &std::path::Path) -> Result<String, std::io::Error> {
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{};base64,{}", mime_for(path), BASE64.encode(bytes)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let body = match args.command {
        ClientCommands::Analyze(command) => InferRequestBody {
            kind: "analyze".to_string(),
            base64_image: encode_image(&command.image_path)?,
            instruction: None,
        },
        ClientCommands::Navigate(command) => InferRequestBody {
            kind: "navigate".to_string(),
            base64_image: encode_image(&command.image_path)?,
            instruction: Some(command.instruction),
        },
    };

    let response = client
        .post(format!("http://{}{}", addr, INFER_ROUTE))
        .json(&body)
        .send()
        .await?;

    println!("HTTP {}", response.status());
    let result = response.json::<serde_json::Value>().await?;
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
