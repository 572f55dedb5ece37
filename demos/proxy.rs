use argh::FromArgs;
use std::{path::PathBuf, sync::Arc};
use watson_infernum::{BackendKind, InferenceEngine, ProxyConfig, backend, server};

#[derive(FromArgs)]
/// Watson proxy forwards image prompts to watsonx.ai vision models.
struct ProxyArgs {
    /// the host to run the server on, overrides HOST
    #[argh(option, short = 'h')]
    host: Option<String>,

    /// the port to run the server on, overrides PORT
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// dotenv-style file completing the environment
    #[argh(option, short = 'e', default = "PathBuf::from(\".env\")")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ProxyArgs = argh::from_env();

    let mut config = ProxyConfig::load(Some(args.env_file.as_path()))?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let backend = backend::from_config(&config)?;
    let engine = Arc::new(InferenceEngine::new(backend, config.prompts.clone()));
    let app = server::router(engine);

    let addr = config.bind_addr();
    log::info!("🚀 Starting the Watson proxy");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Backend: {}", config.backend.as_str());
    match &config.backend {
        BackendKind::Mock => log::info!("🔧 Mock mode, no backend calls will be made"),
        BackendKind::Forward(url) => log::info!("🔧 Forwarding to: {}", url),
        BackendKind::Rest | BackendKind::Sdk => {
            if let Err(missing) = config.watson.credentials() {
                log::warn!("Watson credentials incomplete ({missing}), requests will fail");
            }
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
