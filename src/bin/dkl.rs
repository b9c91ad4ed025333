//! DKL command-line client
//!
//! Uploads images with live progress, builds CDN URLs and checks the API's
//! health from a terminal.

use clap::{Arg, ArgAction, ArgMatches, Command};
use dkl_api_client::{
    ApiClient, ApiError, BatchOptions, ClientConfig, ImageUploadClient, MemoryTokenStore,
    ReqwestTransport, ResponsiveImageGenerator, ResponsiveOptions, ThumbnailOptions,
    Transformation, UploadMode, UploadOptions, UploadableItem,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new("dkl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("DKL API client")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("API base URL (default: $DKL_API_BASE_URL or http://localhost:8082/api)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .help("Bearer token sent with every request")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("upload")
                .about("Upload one image")
                .arg(Arg::new("file").help("Image file").required(true))
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .help("Post the image to this chat channel instead"),
                )
                .arg(
                    Arg::new("caption")
                        .long("caption")
                        .help("Caption for a chat image")
                        .requires("channel"),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Upload several images")
                .arg(
                    Arg::new("files")
                        .help("Image files")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .help("parallel (one request) or sequential (one request per file)")
                        .default_value("parallel"),
                ),
        )
        .subcommand(
            url_command("url", "Build a transformation URL")
                .arg(number_arg("width", 'W', "Width in pixels"))
                .arg(number_arg("height", 'H', "Height in pixels"))
                .arg(Arg::new("crop").long("crop").help("Crop mode"))
                .arg(Arg::new("gravity").long("gravity").help("Gravity"))
                .arg(Arg::new("quality").long("quality").help("Quality"))
                .arg(Arg::new("format").long("format").help("Output format"))
                .arg(
                    Arg::new("dpr")
                        .long("dpr")
                        .help("Device pixel ratio")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(url_command("responsive", "Print src, srcset and sizes"))
        .subcommand(
            url_command("thumbnail", "Build a face-centred thumbnail URL")
                .arg(number_arg("width", 'W', "Width in pixels (default 200)"))
                .arg(number_arg("height", 'H', "Height in pixels (default 200)")),
        )
        .subcommand(Command::new("health").about("Check the API's health"))
}

fn url_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("public_id").help("Image public id").required(true))
        .arg(
            Arg::new("cloud")
                .long("cloud")
                .help("CDN cloud name (default: $DKL_CLOUD_NAME)"),
        )
}

fn number_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .short(short)
        .help(help)
        .value_parser(clap::value_parser!(u32))
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> CliResult<&'a String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| format!("missing argument <{}>", name).into())
}

fn load_config(matches: &ArgMatches) -> CliResult<ClientConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(url) = matches.get_one::<String>("api-url") {
        config = config.api_base_url(url.as_str());
    }
    config.validate()?;
    Ok(config)
}

fn generator(matches: &ArgMatches, config: &ClientConfig) -> CliResult<ResponsiveImageGenerator> {
    match matches.get_one::<String>("cloud") {
        Some(cloud) => Ok(ResponsiveImageGenerator::new(cloud)),
        None => Ok(ResponsiveImageGenerator::from_config(config)?),
    }
}

fn print_progress(label: &str, percent: u8) {
    print!("\r{}: {:>3}%", label, percent);
    let _ = std::io::stdout().flush();
    if percent == 100 {
        println!();
    }
}

async fn run(matches: ArgMatches) -> CliResult<()> {
    let config = load_config(&matches)?;
    let token = matches.get_one::<String>("token").cloned();

    match matches.subcommand() {
        Some(("upload", sub)) => {
            let mut client = ImageUploadClient::from_config(config)?;
            if let Some(token) = token {
                client.set_auth_token(token);
            }

            let item = UploadableItem::from_path(required(sub, "file")?)?;
            let options = UploadOptions::new().on_progress(|p| print_progress("Uploading", p));

            match sub.get_one::<String>("channel") {
                Some(channel) => {
                    let caption = sub.get_one::<String>("caption").map_or("", String::as_str);
                    let message = client
                        .send_chat_image(channel, &item, caption, options)
                        .await?;
                    println!("Posted message {} ({})", message.id, message.file_url);
                }
                None => {
                    let image = client.upload_image(&item, options).await?;
                    println!("Uploaded {}", image.public_id);
                    println!("  url:    {}", image.secure_url);
                    println!("  size:   {}x{} {}", image.width, image.height, image.format);
                }
            }
        }
        Some(("batch", sub)) => {
            let mut client = ImageUploadClient::from_config(config)?;
            if let Some(token) = token {
                client.set_auth_token(token);
            }

            let mode: UploadMode = required(sub, "mode")?.parse()?;
            let items = sub
                .get_many::<String>("files")
                .into_iter()
                .flatten()
                .map(UploadableItem::from_path)
                .collect::<Result<Vec<_>, _>>()?;

            let options = BatchOptions::new()
                .mode(mode)
                .on_progress(|p| print_progress("Batch", p))
                .on_batch_progress(|progress| {
                    if let Some(item) = &progress.current_item {
                        log::info!(
                            "[{}/{}] {}",
                            progress.completed,
                            progress.total,
                            item.name
                        );
                    }
                });

            let result = client.upload_batch(&items, options).await?;
            println!(
                "Uploaded {}/{} images ({} mode)",
                result.uploaded_count, result.total_count, result.mode
            );
            for image in &result.results {
                println!("  {} {}", image.public_id, image.secure_url);
            }
            for error in result.errors.iter().flatten() {
                println!("  failed #{} {}: {}", error.file_index, error.file_name, error.error);
            }
        }
        Some(("url", sub)) => {
            let generator = generator(sub, &config)?;
            let mut transformation = Transformation::new();
            transformation.width = sub.get_one::<u32>("width").copied();
            transformation.height = sub.get_one::<u32>("height").copied();
            transformation.crop = sub.get_one::<String>("crop").cloned();
            transformation.gravity = sub.get_one::<String>("gravity").cloned();
            transformation.quality = sub.get_one::<String>("quality").cloned();
            transformation.format = sub.get_one::<String>("format").cloned();
            transformation.dpr = sub.get_one::<f64>("dpr").copied();

            println!(
                "{}",
                generator.custom_url(required(sub, "public_id")?, &transformation)
            );
        }
        Some(("responsive", sub)) => {
            let generator = generator(sub, &config)?;
            let image =
                generator.responsive_urls(required(sub, "public_id")?, &ResponsiveOptions::default());
            println!("src:    {}", image.src);
            println!("srcset: {}", image.src_set);
            println!("sizes:  {}", image.sizes);
        }
        Some(("thumbnail", sub)) => {
            let generator = generator(sub, &config)?;
            let mut options = ThumbnailOptions::default();
            if let Some(width) = sub.get_one::<u32>("width") {
                options.width = *width;
            }
            if let Some(height) = sub.get_one::<u32>("height") {
                options.height = *height;
            }
            println!(
                "{}",
                generator.thumbnail_url(required(sub, "public_id")?, &options)
            );
        }
        Some(("health", _)) => {
            let tokens = match token {
                Some(token) => MemoryTokenStore::with_tokens(token, None),
                None => MemoryTokenStore::new(),
            };
            let transport = ReqwestTransport::new(&config)?;
            let client = ApiClient::new(config, Arc::new(transport), Arc::new(tokens));

            let health = client.health().await?;
            println!("status: {}", health.status);
            if let Some(version) = &health.version {
                println!("version: {}", version);
            }
        }
        _ => {
            eprintln!("No subcommand provided. Use --help for usage information.");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(matches).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => eprintln!("Error: {}", api_error.user_message()),
            None => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}
