use clap::Parser;
use quizforge::generate::Generator;
use quizforge::names;
use quizforge::store::Store;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// OpenAI API key.
    #[clap(env)]
    openai_api_key: String,

    /// The model used for quiz generation.
    #[arg(long, env, default_value = names::DEFAULT_OPENAI_MODEL)]
    openai_model: String,

    /// Directory holding quizzes, history and users.
    #[arg(long, env, default_value = "data")]
    data_dir: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,quizforge=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let store = Store::new(&args.data_dir)?;
    let http = reqwest::Client::new();
    let generator = Generator::new(http.clone(), args.openai_api_key, args.openai_model);
    let app = quizforge::router(quizforge::AppState {
        store,
        generator,
        http,
    });

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(listener, app).await?;

    Ok(())
}
