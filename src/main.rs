use std::env;

use anyhow::Context;
use mo_auth::{
    build_authorization_header, build_digest_string, canonical_message,
    config::AppConfig,
    error::ErrorHandler,
    content_md5, current_unix_timestamp, random_nonce, sign, Credentials, RequestDescriptor,
};
use tracing_subscriber::EnvFilter;

struct Args {
    config_path: Option<String>,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { config_path: None, json: false };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config_path = Some(iter.next().context("--config needs a file path")?);
            }
            "--json" => args.json = true,
            other => anyhow::bail!("Unknown argument: {} (usage: mo-auth [--config <file>] [--json])", other),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::from_env(),
    }
    .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.level))
        .init();

    let method = config.method()?;
    tracing::info!("Building authorization for {} {}", method, config.request.path);

    if config.api.has_access_token() {
        let body = config.request.body.as_deref().map(|content| mo_auth::Body {
            content_type: &config.request.content_type,
            content,
        });
        let auth = config
            .api
            .authenticator()
            .authorize(method, &config.request.path, body)?
            .context("No authorization could be built from the configured access token")?;

        if args.json {
            let output = serde_json::json!({ "authorization": auth.header });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Authorization header: {}", auth.header);
        }
        return Ok(());
    }

    let mut request = RequestDescriptor::new(method.as_str(), &config.request.path);
    if let Some(body) = &config.request.body {
        request = request.with_content(&config.request.content_type, content_md5(body));
    }

    let mut credentials = Credentials::new(
        &config.api.api_key,
        &config.api.api_secret,
        random_nonce(config.api.nonce_length)?,
        current_unix_timestamp(),
        &config.api.company_code,
    );
    credentials.device_token = config.api.device_token.clone();
    credentials.impersonated_user_id = config.api.impersonated_user_id;

    let signed = sign(&request, &credentials)
        .map_err(|e| anyhow::anyhow!(ErrorHandler::handle_error(&e)))?;
    let digest = build_digest_string(&signed);
    let header = build_authorization_header(&signed);

    if args.json {
        let output = serde_json::json!({
            "message": canonical_message(&request, &credentials),
            "credentials": signed,
            "digest": digest,
            "authorization": header,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("HMAC message to sign: {}", canonical_message(&request, &credentials));
        println!("HMAC signature:       {}", signed.signature);
        println!("Digest string:        {}", digest);
        println!("Authorization header: {}", header);
    }

    Ok(())
}
