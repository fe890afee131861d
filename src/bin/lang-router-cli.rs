use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use lang_router::config::load_config;
use lang_router::language::DiscardLocale;
use lang_router::routing::{LanguageRoutes, Params, Parsed, PathRequest};
use lang_router::rules::open_store;

#[derive(Parser)]
#[command(name = "lang-router-cli")]
#[command(about = "Inspect language routing for a configuration", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "lang-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective rule set
    Rules,
    /// Create a URL for a route
    Generate {
        route: String,
        /// Route parameter as name=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Current language before generating
        #[arg(short, long)]
        language: Option<String>,
        /// Produce an absolute URL
        #[arg(short, long)]
        absolute: bool,
    },
    /// Resolve a path
    Parse {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Request origin, e.g. http://www.example.com
        #[arg(long)]
        host: Option<String>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{}`", s))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let routes = Arc::new(LanguageRoutes::build(&config, open_store(&config.cache))?);
    let mut router = routes.router(Arc::new(DiscardLocale));

    let output = match cli.command {
        Commands::Rules => {
            let rules: Vec<_> = routes.engine().rules().iter().map(|r| r.spec()).collect();
            json!({
                "languages": routes.table().entries(),
                "default_language": routes.table().default_code(),
                "digest": routes.digest(),
                "cache": format!("{:?}", routes.cache_outcome()),
                "rules": rules,
            })
        }
        Commands::Generate { route, params, language, absolute } => {
            if let Some(code) = language {
                router.set_current_language(&code)?;
            }
            let params: Params = params.into_iter().collect();
            let url = if absolute {
                router.generate_absolute(&route, &params, None)?
            } else {
                router.generate(&route, &params)?
            };
            json!({ "url": url })
        }
        Commands::Parse { path, method, host } => {
            let mut request = PathRequest::new(path, method.parse()?);
            request.host_info = host;
            match router.parse(&request) {
                Ok(Some(Parsed::Route(matched))) => {
                    let language = router.current_language().to_string();
                    json!({
                        "route": matched.route,
                        "params": matched.params,
                        "language": language,
                        "locale": router.current_locale(),
                    })
                }
                Ok(Some(Parsed::Redirect { location })) => json!({ "redirect": location }),
                Ok(None) => json!({ "error": "no route matched" }),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
