use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use popup_auth::{
    AuthorizationRequest, LoopbackConfig, LoopbackOpener, Outcome, PopupAuthError, PopupFlow,
    PopupFlowConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "popup-auth",
    about = "Open an authorization page in the browser, wait for the callback and print its query parameters as JSON."
)]
struct Cli {
    #[command(flatten)]
    polling: PollingArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PollingArgs {
    /// Milliseconds between checks of the callback listener.
    #[arg(long, global = true, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Seconds before a PayPal approval is given up.
    #[arg(long, global = true, default_value_t = 300)]
    timeout_secs: u64,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// OAuth 2.0 redirect flow; completes when the browser reaches the redirect uri.
    Oauth {
        #[arg(long)]
        authorization_url: String,
        /// Defaults to the `redirect_uri` parameter of the authorization url.
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// PayPal order approval; completes on a return url carrying `token` and `PayerID`.
    Paypal {
        #[arg(long)]
        approval_url: String,
        #[arg(long)]
        return_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), PopupAuthError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PopupFlowConfig::new()
        .with_poll_interval(Duration::from_millis(cli.polling.poll_interval_ms))
        .with_timeout(Duration::from_secs(cli.polling.timeout_secs));

    let outcome = match cli.command {
        Command::Oauth {
            authorization_url,
            redirect_uri,
        } => run_oauth(config, &authorization_url, redirect_uri).await?,
        Command::Paypal {
            approval_url,
            return_url,
        } => run_paypal(config, &approval_url, &return_url).await?,
    };

    let output =
        serde_json::to_string_pretty(&outcome).map_err(|err| PopupAuthError::InvalidResponse {
            message: err.to_string(),
        })?;

    println!("{output}");
    Ok(())
}

async fn run_oauth(
    config: PopupFlowConfig,
    authorization_url: &str,
    redirect_uri: Option<String>,
) -> Result<Outcome, PopupAuthError> {
    let mut request = AuthorizationRequest::new(authorization_url)?;
    if let Some(redirect_uri) = redirect_uri {
        request = request.with_redirect_prefix(redirect_uri);
    }
    let redirect_uri = request.redirect_prefix.clone().ok_or_else(|| {
        PopupAuthError::InvalidRedirectUri(
            "authorization url has no redirect_uri; pass --redirect-uri".to_string(),
        )
    })?;

    let opener = browser_opener(LoopbackConfig::from_callback_url(&redirect_uri)?);
    PopupFlow::new(opener, config).authorize(&request).await
}

async fn run_paypal(
    config: PopupFlowConfig,
    approval_url: &str,
    return_url: &str,
) -> Result<Outcome, PopupAuthError> {
    let request = AuthorizationRequest::new(approval_url)?.without_redirect_prefix();
    let opener = browser_opener(LoopbackConfig::from_callback_url(return_url)?);
    PopupFlow::new(opener, config).authorize(&request).await
}

fn browser_opener(config: LoopbackConfig) -> LoopbackOpener {
    LoopbackOpener::new(config).with_browser(|url| {
        eprintln!("Authorization URL:\n{url}");
        if let Err(err) = webbrowser::open(url) {
            eprintln!("Failed to open browser automatically: {err}");
        }
        Ok(())
    })
}
