use clap::{Parser, Subcommand};
use kolicatch::config::{self, SiteConfig};
use kolicatch::delivery::{HttpTransport, ProviderChain};
use kolicatch::output;
use kolicatch::preload::{LayoutSpec, PageLayout};
use kolicatch::submission::{ContactForm, Notice, SubmitError};
use kolicatch::types::{FormData, OrderType};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Contact form fields, shared by `submit` and `validate`.
#[derive(clap::Args, Clone)]
struct FormArgs {
    /// Sender's name
    #[arg(long, default_value = "")]
    name: String,

    /// Sender's email address
    #[arg(long, default_value = "")]
    email: String,

    /// home, bulk, or inquiry
    #[arg(long)]
    order_type: Option<OrderType>,

    /// Message body
    #[arg(long, default_value = "")]
    message: String,

    /// Hidden bot trap; real visitors leave it empty
    #[arg(long, default_value = "", hide = true)]
    honeypot: String,
}

impl From<FormArgs> for FormData {
    fn from(args: FormArgs) -> Self {
        FormData {
            name: args.name,
            email: args.email,
            order_type: args.order_type,
            message: args.message,
            honeypot: args.honeypot,
        }
    }
}

#[derive(Parser)]
#[command(name = "kolicatch")]
#[command(about = "Contact form delivery and image loading tools for the Kolicatch storefront")]
#[command(long_about = "\
Contact form delivery and image loading tools for the Kolicatch storefront

Configuration is read from <config>/config.toml on top of built-in defaults.
Provider credentials can also come from the environment:

  KOLICATCH_BACKEND_URL            site backend base URL
  KOLICATCH_EMAILJS_SERVICE_ID     EmailJS service
  KOLICATCH_EMAILJS_TEMPLATE_ID    EmailJS template
  KOLICATCH_EMAILJS_PUBLIC_KEY     EmailJS public key
  KOLICATCH_WEB3FORMS_KEY          Web3Forms access key

Providers are tried in order: backend, EmailJS, Web3Forms. The first one
that accepts the message wins.

Set RUST_LOG=debug to trace provider attempts and image gate decisions.

Run 'kolicatch gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and deliver one contact message
    Submit(FormArgs),
    /// Run the form checks without sending anything
    Validate(FormArgs),
    /// Show the provider chain and setup steps for missing providers
    Providers,
    /// Mount a page layout and scroll it, printing the image fetches that start
    SimulateImages {
        /// Page layout TOML file
        layout: PathBuf,

        /// Scroll positions to visit in order, in pixels
        #[arg(long = "scroll")]
        scroll: Vec<f64>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Submit(args) => {
            let site_config = config::load_config(&cli.config)?;
            let chain = ProviderChain::from_config(&site_config);
            let transport = HttpTransport::new()?;
            let mut form = contact_form(&site_config, args);
            match form.submit(Instant::now(), &chain, &transport) {
                Ok(delivery) => {
                    output::print_notice(&Notice::success(form.recipient()));
                    output::print_delivery(&delivery);
                }
                Err(err) => {
                    output::print_notice(&err.notice());
                    if let SubmitError::Invalid(result) = &err {
                        output::print_validation(result);
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Validate(args) => {
            let site_config = config::load_config(&cli.config)?;
            let mut form = contact_form(&site_config, args);
            match form.validate(Instant::now()) {
                Ok(_) => output::print_validation(form.errors()),
                Err(SubmitError::Invalid(result)) => {
                    output::print_validation(&result);
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => {
                    output::print_notice(&err.notice());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Providers => {
            let site_config = config::load_config(&cli.config)?;
            output::print_providers(&ProviderChain::from_config(&site_config));
        }
        Command::SimulateImages { layout, scroll } => {
            let site_config = config::load_config(&cli.config)?;
            let spec = LayoutSpec::load(&layout)?;
            let mut page = PageLayout::new(spec, &site_config.images);
            output::print_fetch_events("Mount", &page.mount());
            for y in scroll {
                let events = page.scroll_to(y);
                output::print_fetch_events(&format!("Scroll to {y}px"), &events);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn contact_form(site_config: &SiteConfig, args: FormArgs) -> ContactForm {
    let mut form = ContactForm::new(site_config);
    *form.data_mut() = args.into();
    form
}
