use clap::Parser;

pub(crate) enum RunOutcome {
    Serve(cihuy::config::AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();

    let supabase = match (cli.supabase_url, cli.supabase_key) {
        (Some(url), Some(key)) => Some(cihuy::config::SupabaseConfig { url, key }),
        (None, None) => None,
        _ => {
            eprintln!("error: --supabase-url and --supabase-key must be provided together");
            return RunOutcome::Exit(2);
        }
    };

    let gemini = cli
        .gemini_api_key
        .map(|api_key| cihuy::config::GeminiConfig { api_key });
    let fcm = cli
        .fcm_server_key
        .map(|server_key| cihuy::config::FcmConfig { server_key });

    RunOutcome::Serve(cihuy::config::AppConfig {
        port: cli.port,
        supabase,
        gemini,
        fcm,
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "cihuy",
    version,
    about = "Smoking-cessation companion backend"
)]
struct Cli {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,
    #[arg(long, env = "SUPABASE_KEY")]
    supabase_key: Option<String>,
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
    #[arg(long, env = "FCM_SERVER_KEY")]
    fcm_server_key: Option<String>,
}
