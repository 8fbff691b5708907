// SPDX-License-Identifier: MPL-2.0
use bunker_i18n::config::{self, log_filter};
use bunker_i18n::i18n::detector::ProbeContext;
use bunker_i18n::i18n::Localizer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Detect a display locale and resolve translation keys.

USAGE:
  bunker-i18n [OPTIONS] [KEY]...

OPTIONS:
  --config PATH             settings.toml to load instead of the default location
  --lang TAG                explicit locale, outranks every other signal
  --cookie HEADER           raw Cookie header of the request
  --accept-language HEADER  raw Accept-Language header of the request
  --system                  consult the operating system locale last
  -h, --help                print this help
";

struct Flags {
    config_path: Option<PathBuf>,
    lang: Option<String>,
    cookie: Option<String>,
    accept_language: Option<String>,
    system: bool,
    keys: Vec<String>,
}

fn parse_flags() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    Ok(Some(Flags {
        config_path: args.opt_value_from_str("--config")?,
        lang: args.opt_value_from_str("--lang")?,
        cookie: args.opt_value_from_str("--cookie")?,
        accept_language: args.opt_value_from_str("--accept-language")?,
        system: args.contains("--system"),
        keys: args
            .finish()
            .into_iter()
            .filter_map(|s| s.into_string().ok())
            .collect(),
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let Some(flags) = parse_flags()? else {
        print!("{}", HELP);
        return Ok(());
    };

    let mut settings = match &flags.config_path {
        Some(path) => config::load_from_path(path)?,
        None => {
            let (settings, warning) = config::load();
            if let Some(warning) = warning {
                tracing::warn!("{}", warning);
            }
            settings
        }
    };
    settings.locales.use_system_locale |= flags.system;

    let localizer = Localizer::from_config(flags.lang, &settings)?;

    let mut ctx = ProbeContext::new();
    if let Some(cookie) = flags.cookie.as_deref() {
        ctx = ctx.with_request_cookies(cookie);
    }
    if let Some(header) = flags.accept_language.as_deref() {
        ctx = ctx.with_accept_language(header);
    }

    let i18n = localizer.session(&ctx);
    match i18n.lang_name() {
        Some(name) => println!("{} ({})", i18n.lang(), name),
        None => println!("{}", i18n.lang()),
    }
    for key in &flags.keys {
        println!("{} = {}", key, i18n.t(key));
    }
    Ok(())
}
