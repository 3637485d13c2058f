use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use image::GenericImageView;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gamecover::application::{CoverRequest, GetCoverUseCase};
use gamecover::domain::ports::ProfileStorePort;
use gamecover::infrastructure::config::{CONFIG_FILE_NAME, Command, LoadedConfig, ProfileCommand};
use gamecover::infrastructure::image::cover_url;
use gamecover::infrastructure::{
    AppConfig, AvatarCache, CliArgs, ConfigStore, CoverCache, HttpImageFetcher, JsonProfileStore,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<LoadedConfig> {
    let store = ConfigStore::locate(args.config.as_deref()).unwrap_or_else(|_| {
        ConfigStore::at(
            std::env::temp_dir()
                .join(gamecover::NAME)
                .join(CONFIG_FILE_NAME),
        )
    });
    let mut loaded = store.load().wrap_err("Failed to load configuration")?;
    loaded.config.merge_with_args(args);
    Ok(loaded)
}

fn cover_request(
    game: String,
    region: Option<String>,
    user: Option<String>,
    kind: Option<gamecover::domain::entities::CoverKind>,
) -> CoverRequest {
    let mut request = CoverRequest::new(game);
    if let Some(region) = region {
        request = request.with_region(region);
    }
    if let Some(user) = user {
        request = request.for_user(user);
    }
    if let Some(kind) = kind {
        request = request.with_kind(kind);
    }
    request
}

async fn run(config: AppConfig, command: Command) -> Result<()> {
    let fetcher = Arc::new(HttpImageFetcher::new(config.request_timeout())?);
    let profiles = Arc::new(JsonProfileStore::new(config.effective_users_dir()));
    let covers = Arc::new(CoverCache::new(config.cover_cache_config(), fetcher.clone()));
    let use_case = GetCoverUseCase::new(covers.clone(), profiles.clone());

    match command {
        Command::Resolve {
            game,
            region,
            user,
            kind,
        } => {
            let (descriptor, source) = use_case
                .describe(&cover_request(game, region, user, kind))
                .await;
            let report = json!({
                "platform": descriptor.platform().as_str(),
                "kind": descriptor.kind().as_str(),
                "region": descriptor.region().as_str(),
                "region_preference": source.description(),
                "dimensions": descriptor.dimensions().to_string(),
                "extension": descriptor.extension().as_str(),
                "cache_key": descriptor.cache_key().as_str(),
                "url": cover_url(&config.art_base_url, &descriptor),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Fetch {
            game,
            region,
            user,
            kind,
            output,
        } => {
            let response = use_case
                .execute(&cover_request(game, region, user, kind))
                .await
                .wrap_err("Failed to load cover")?;
            let path = covers.entry_path(response.descriptor.cache_key())?;
            let (width, height) = response.cover.image.dimensions();
            println!(
                "{} {}x{} ({:?})",
                path.display(),
                width,
                height,
                response.cover.source
            );

            if let Some(output) = output {
                tokio::fs::copy(&path, &output)
                    .await
                    .wrap_err_with(|| format!("Failed to copy cover to {}", output.display()))?;
            }
        }
        Command::Profile(ProfileCommand::Create { user, name }) => {
            let key = profiles.create(&user, &name).await?;
            println!("{key}");
        }
        Command::Profile(ProfileCommand::Get { user }) => {
            let profile = profiles.get(&user).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Profile(ProfileCommand::SetRegion { user, region }) => {
            profiles
                .edit_value(&user, json!({ "coverregion": region }))
                .await?;
            let stored = profiles.cover_region(&user).await?;
            println!("{}", stored.unwrap_or_default());
        }
        Command::Avatar { user, hash } => {
            let avatars = AvatarCache::new(
                config.effective_avatar_dir(),
                config.avatar_base_url.clone(),
                fetcher,
            );
            avatars.refresh(&user, &hash).await?;
            println!("{}", avatars.avatar_path(&user)?.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let loaded = load_config(&args)?;
    init_logging(&loaded.config)?;
    loaded.report();

    info!(version = gamecover::VERSION, "Starting gamecover");

    run(loaded.config, args.command).await
}
