use anyhow::{bail, Result};
use clap::Parser;
use client_core::{AdoptionClient, ClientConfig};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "https://frontend-take-home-service.fetch.com")]
    base_url: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Breed filter; repeat the flag to select several.
    #[arg(long = "breed")]
    breeds: Vec<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Sort breeds Z-A instead of A-Z.
    #[arg(long)]
    descending: bool,
    /// Favorite the first N results and request a match for them.
    #[arg(long, default_value_t = 0)]
    match_first: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config = ClientConfig::new(&args.base_url)?;
    let client = AdoptionClient::new(config)?;

    if let Err(err) = client.login(&args.name, &args.email).await {
        bail!("login failed: {}", err.message);
    }
    println!("Logged in as {}", args.name);

    let breeds = client.load_breeds().await;
    match breeds.error {
        Some(err) => println!("Breed directory unavailable: {err}"),
        None => println!("{} breeds available", breeds.breeds.len()),
    }

    if args.descending {
        client.toggle_sort().await;
    }
    let mut view = client.set_breed_filters(args.breeds).await;
    if args.page > 1 {
        view = client.go_to_page(args.page).await;
    }
    if let Some(err) = &view.error {
        bail!("search failed: {err}");
    }
    println!(
        "Page {} of {} ({} total results)",
        view.current_page,
        client.total_pages().await,
        view.total_results
    );
    for record in &view.records {
        println!(
            "  {}  {} ({}, age {}, zip {})",
            record.id, record.name, record.breed, record.age, record.zip_code
        );
    }

    if args.match_first > 0 {
        for record in view.records.iter().take(args.match_first) {
            client.toggle_favorite(&record.id).await;
        }
        let outcome = client.run_match().await;
        match (outcome.matched_record, outcome.error) {
            (Some(record), _) => {
                println!("Matched with {} ({}), id {}", record.name, record.breed, record.id);
            }
            (None, Some(err)) => println!("Match failed: {err}"),
            (None, None) => println!("Match produced no result"),
        }
    }

    client.logout().await;
    println!("Logged out");
    Ok(())
}
