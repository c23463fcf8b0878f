//! # Seed Data Generator
//!
//! Populates a database with demo clients and quotes for development.
//!
//! ## Usage
//! ```bash
//! # 10 clients (default), two quotes each
//! cargo run -p kensai-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p kensai-db --bin seed -- --clients 50 --db ./data/kensai.db
//! ```
//!
//! Every third client buys on credit (30 days). Each client gets one open
//! quote and one quote with a deposit recorded against it.

use std::env;

use chrono::{Days, NaiveDate};
use kensai_core::{Client, Fields, Payment, Quote, QuoteItem};
use kensai_db::{Database, DbConfig};
use serde_json::json;
use uuid::Uuid;

const COMPANIES: &[&str] = &[
    "Acme", "Grupo Norte", "Lonas del Bajío", "Rotulos Express", "Imprenta Sol",
    "Café Central", "Taller Ruiz", "Farmacia Luz", "Hotel Mirador", "Constructora Alba",
];

/// Catalogue of `(description, unit price)` used for items.
const PRODUCTS: &[(&str, f64)] = &[
    ("Lona impresa m²", 185.0),
    ("Vinil de corte m²", 240.0),
    ("Tarjetas de presentación (millar)", 650.0),
    ("Instalación", 900.0),
    ("Diseño", 1200.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 10;
    let mut db_path = String::from("./kensai_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("KENSAI Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --clients <N>  Number of clients to generate (default: 10)");
                println!("  -d, --db <PATH>    Database file path (default: ./kensai_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("KENSAI Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Clients:  {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.clients().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} clients", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 8).ok_or("invalid base date")?;
    let mut quotes = 0;

    for seed in 0..count {
        let client = generate_client(seed);
        db.clients().create(&client).await?;

        for (n, with_deposit) in [false, true].into_iter().enumerate() {
            let date = base_date
                .checked_add_days(Days::new((seed * 3 + n) as u64))
                .ok_or("date overflow")?;
            let quote = generate_quote(&client, seed * 2 + n, date, with_deposit);
            if let Err(e) = db.quotes().save(&quote).await {
                eprintln!("Failed to save {}: {}", quote.quote_number, e);
                continue;
            }
            quotes += 1;
        }
    }

    println!();
    println!(
        "✓ Generated {} clients and {} quotes in {:?}",
        count,
        quotes,
        start.elapsed()
    );
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_client(seed: usize) -> Client {
    let company = COMPANIES[seed % COMPANIES.len()];
    let on_credit = seed % 3 == 0;
    let slug: String = company
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    Client {
        id: format!("C-{:03}", seed + 1),
        name: if seed < COMPANIES.len() {
            company.to_string()
        } else {
            format!("{} {}", company, seed / COMPANIES.len() + 1)
        },
        email: format!("compras{}@{}.mx", seed + 1, slug),
        phone: format!("55 {:04} {:04}", 1000 + seed, 2000 + seed * 7 % 8000),
        address: String::new(),
        credit_status: if on_credit { "Credito" } else { "Contado" }.to_string(),
        credit_days: if on_credit { 30 } else { 0 },
    }
}

fn generate_quote(client: &Client, seed: usize, date: NaiveDate, with_deposit: bool) -> Quote {
    let items: Vec<QuoteItem> = (0..1 + seed % 3)
        .map(|n| {
            let (description, price) = PRODUCTS[(seed + n) % PRODUCTS.len()];
            QuoteItem::from(fields(json!({
                "description": description,
                "quantity": 1 + (seed + n) % 4,
                "price": price,
            })))
        })
        .collect();

    let payments = if with_deposit {
        vec![Payment::from(fields(json!({
            "id": Uuid::new_v4().to_string(),
            "amount": 500.0,
            "date": date.to_string(),
            "method": "Transferencia",
            "type": "deposit",
        })))]
    } else {
        Vec::new()
    };

    Quote {
        id: Uuid::new_v4().to_string(),
        quote_number: format!("Q-{}", 100 + seed),
        date: date.to_string(),
        client_id: client.id.clone(),
        status: if with_deposit { "Aceptada" } else { "Pendiente" }.to_string(),
        payment_condition: if client.has_credit_terms() {
            "Credito"
        } else {
            "Contado"
        }
        .to_string(),
        tax_rate: 0.16,
        items,
        payments,
        expires: date.checked_add_days(Days::new(15)).map(|d| d.to_string()),
        company: Some(fields(json!({
            "name": "KENSAI Impresos",
            "address": "Av. Reforma 100, CDMX",
        }))),
        notes: None,
        salesperson_id: None,
        acceptance_date: with_deposit.then(|| date.to_string()),
    }
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}
