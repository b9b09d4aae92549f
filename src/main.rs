mod client;
mod config;
mod metrics;
mod report;
mod schema;
mod stats;

use crate::client::ApiClient;
use crate::metrics::Window;
use crate::report::{ALL_SITES, Lookups, build_report, write_csv};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, Write};

const MAX_LOGIN_ATTEMPTS: usize = 3;

#[derive(Parser)]
#[command(
    name = "pcmctl",
    version,
    about = "Report WAN circuit path capacity (PCM) statistics to CSV"
)]
struct Cli {
    #[arg(
        long,
        short = 'C',
        value_name = "URL",
        help = "Controller URI, ex. https://api.elcapitan.cloudgenix.com"
    )]
    controller: Option<String>,

    #[arg(long, short = 'E', help = "Use this email as user name instead of prompting")]
    email: Option<String>,

    #[arg(
        long = "pass",
        short = 'P',
        help = "Use this password instead of prompting"
    )]
    password: Option<String>,

    #[arg(
        long,
        short = 'S',
        default_value = ALL_SITES,
        help = "Name of the site, or the keyword ALL_SITES"
    )]
    sitename: String,

    #[arg(
        long,
        short = 'H',
        default_value = "24",
        help = "Number of hours back from now to query, or the keyword RANGE for an explicit time range"
    )]
    hours: String,

    #[arg(
        long,
        value_name = "TIMESTAMP",
        help = "With RANGE, start time in format YYYY-MM-DDTHH:MM:SSZ"
    )]
    starttime: Option<String>,

    #[arg(
        long,
        value_name = "TIMESTAMP",
        help = "With RANGE, end time in format YYYY-MM-DDTHH:MM:SSZ"
    )]
    endtime: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("reading current directory")?;

    // Validate the window before touching the network.
    let window = Window::from_args(
        &cli.hours,
        cli.starttime.as_deref(),
        cli.endtime.as_deref(),
    )?;

    let explicit_login = cli.email.is_some() || cli.password.is_some();
    let creds = config::resolve(&cwd, cli.controller, cli.email, cli.password)?;
    let mut client = ApiClient::new(&creds.controller)?;
    println!(
        "pcmctl v{} ({})\n",
        env!("CARGO_PKG_VERSION"),
        client.controller()
    );

    match (&creds.auth_token, explicit_login) {
        (Some(token), false) => client.login_token(token)?,
        _ => login_with_prompt(&mut client, creds.email, creds.password)?,
    }

    let lookups = Lookups::load(&client)?;

    let Some(site_ids) = lookups.select_sites(&cli.sitename) else {
        println!("INFO: Logging Out");
        client.logout();
        bail!("invalid site name: {}, please reenter sitename", cli.sitename);
    };
    if cli.sitename == ALL_SITES {
        println!("INFO: PCM Data for ALL Sites");
    } else {
        println!("INFO: Getting PCM Data for {}", cli.sitename);
    }

    let rows = build_report(&client, &lookups, &site_ids, &window)?;

    let tenant = client.tenant_name.clone().unwrap_or_else(|| "tenant".to_string());
    write_csv(&rows, &tenant, &cwd)?;

    println!("INFO: Logging Out");
    client.logout();
    Ok(())
}

/// Credential login with a bounded number of attempts. Missing fields are
/// prompted for; a rejected attempt clears both so the next one re-prompts.
fn login_with_prompt(
    client: &mut ApiClient,
    mut email: Option<String>,
    mut password: Option<String>,
) -> Result<()> {
    for _ in 0..MAX_LOGIN_ATTEMPTS {
        let user = match email.take() {
            Some(user) => user,
            None => prompt("login email: ")?,
        };
        let pass = match password.take() {
            Some(pass) => pass,
            None => prompt("password: ")?,
        };
        if client.login_password(&user, &pass)? {
            return Ok(());
        }
        println!("ERR: Login failed, please try again");
    }
    bail!("login failed after {MAX_LOGIN_ATTEMPTS} attempts")
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading from stdin")?;
    Ok(line.trim().to_string())
}
