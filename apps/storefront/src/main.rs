use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, prepare_api_base_url},
    filters::DEFAULT_SORT_KEY,
    CartOutcome, FetchOutcome, SkipReason, SortKey, StockFilter, StorefrontClient, SubmitOutcome,
    View,
};
use shared::domain::LessonId;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides `api_base_url` from storefront.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filtered, sorted catalog.
    Lessons {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = DEFAULT_SORT_KEY)]
        sort: SortKey,
        #[arg(long, default_value = "all")]
        stock: StockFilter,
        #[arg(long, default_value_t = client_core::filters::DEFAULT_MIN_PRICE)]
        min_price: f64,
        #[arg(long, default_value_t = client_core::filters::DEFAULT_MAX_PRICE)]
        max_price: f64,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the distinct lesson locations.
    Locations,
    /// Add one seat per `--lesson` flag and place the order.
    Order {
        #[arg(long = "lesson", required = true)]
        lessons: Vec<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings().context("failed to load storefront settings")?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let base_url = prepare_api_base_url(&settings.api_base_url)?;
    info!(api = %base_url, "storefront: using catalog service");
    let client = StorefrontClient::over_http(base_url);

    match cli.command {
        Command::Lessons {
            search,
            sort,
            stock,
            min_price,
            max_price,
            location,
            json,
        } => {
            let outcome = match search {
                Some(term) => client.search(&term).await,
                None => client.fetch_lessons().await,
            };
            ensure_loaded(outcome)?;
            client
                .update_filters(|filters| {
                    filters.sort_key = sort;
                    filters.filter_key = stock;
                    filters.min_price = min_price;
                    filters.max_price = max_price;
                    filters.location_filter = location;
                })
                .await;

            let displayed = client.snapshot().await.displayed_lessons();
            if json {
                println!("{}", serde_json::to_string_pretty(&displayed)?);
            } else {
                for lesson in &displayed {
                    println!(
                        "{:<8} {:<20} {:<16} {:>8.2} {:>4} spaces",
                        lesson.id, lesson.subject, lesson.location, lesson.price, lesson.spaces
                    );
                }
            }
        }
        Command::Locations => {
            ensure_loaded(client.fetch_lessons().await)?;
            for location in client.snapshot().await.location_options() {
                println!("{location}");
            }
        }
        Command::Order {
            lessons,
            name,
            phone,
            email,
            address,
        } => {
            ensure_loaded(client.fetch_lessons().await)?;
            for raw_id in lessons {
                let lesson_id = LessonId(raw_id);
                match client.add_to_cart(&lesson_id).await {
                    CartOutcome::Confirmed(lesson) => {
                        println!("reserved {} ({} spaces left)", lesson.subject, lesson.spaces)
                    }
                    CartOutcome::Skipped => bail!("lesson {lesson_id} is unknown or sold out"),
                    CartOutcome::Diverged(message) => {
                        bail!("could not reserve lesson {lesson_id}: {message}")
                    }
                    CartOutcome::Discarded | CartOutcome::Deferred => {}
                }
            }

            client
                .update_form(|form| {
                    form.name = name;
                    form.phone = phone;
                    form.email = email;
                    form.address = address;
                })
                .await;
            client.navigate(View::Cart).await;
            client.navigate(View::Checkout).await;

            let snapshot = client.snapshot().await;
            let total = snapshot.cart_total();
            match client.submit_order().await {
                SubmitOutcome::Submitted(receipt) => {
                    println!(
                        "order placed: total {total:.2}{}",
                        receipt
                            .order_id
                            .map(|id| format!(" (order {id})"))
                            .unwrap_or_default()
                    );
                }
                SubmitOutcome::Skipped(SkipReason::InvalidCustomer) => {
                    bail!("order not submitted: check name, phone and address")
                }
                SubmitOutcome::Skipped(reason) => bail!("order not submitted: {reason:?}"),
                SubmitOutcome::Failed(message) => return Err(anyhow!(message)),
            }
        }
    }

    Ok(())
}

fn ensure_loaded(outcome: FetchOutcome) -> Result<()> {
    match outcome {
        FetchOutcome::Applied { lessons } => {
            info!(lessons, "storefront: catalog loaded");
            Ok(())
        }
        FetchOutcome::Stale => Ok(()),
        FetchOutcome::Failed(message) => Err(anyhow!(message)),
    }
}
