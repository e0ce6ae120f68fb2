use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use expense_tracker::{
    CreateCategoryOutcome, CreateCategoryRequest, CreationDuration, NewTransaction, NewUser,
    PasswordHash, PeriodType, SourceName, ValidatedPassword, create_category, create_source,
    create_transaction, create_user, initialize_db, parse_email,
};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "purple-kettle-ledger-42";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let now_utc = OffsetDateTime::now_utc();
    let now = PrimitiveDateTime::new(now_utc.date(), now_utc.time());

    println!("Creating verified demo user {DEMO_EMAIL}...");
    let password = ValidatedPassword::new(DEMO_PASSWORD)?;
    let user = create_user(
        NewUser {
            email: parse_email(DEMO_EMAIL)?,
            password_hash: PasswordHash::new(&password, PasswordHash::DEFAULT_COST)?,
            name: "Demo User".to_owned(),
            budget: 3000.0,
            created_at: now,
        },
        &conn,
    )?;
    conn.execute("UPDATE user SET is_verified = 1 WHERE id = ?1", [user.id.as_i64()])?;

    println!("Creating sources...");
    let cash = create_source(user.id, &SourceName::new("Cash")?, now, &conn)?;
    let card = create_source(user.id, &SourceName::new("Credit Card")?, now, &conn)?;

    println!("Creating categories...");
    let mut categories = Vec::new();
    for (name, icon, budget, period_type) in [
        ("Groceries", "cart", 600.0, PeriodType::Monthly),
        ("Rent", "house", 1800.0, PeriodType::Monthly),
        ("Car Insurance", "car", 450.0, PeriodType::HalfYearly),
        ("Concert", "music", 120.0, PeriodType::Once),
    ] {
        let request = CreateCategoryRequest {
            category: name.to_owned(),
            icon: icon.to_owned(),
            budget,
            period_type,
            start_month: Some(u8::from(now.month().previous())),
            creation_duration: CreationDuration::YearEnd,
        };

        if let CreateCategoryOutcome::Created(created) = create_category(user.id, &request, now, &conn)? {
            categories.extend(created);
        }
    }

    println!("Creating transactions...");
    let mut transaction_count = 0;
    for (i, category) in categories
        .iter()
        .filter(|category| category.created_at <= now)
        .enumerate()
    {
        for day in 0..3 {
            let date = category.created_at.date() + Duration::days(day * 7 + i as i64);
            if date > now.date() {
                break;
            }

            create_transaction(
                &NewTransaction {
                    user_id: user.id,
                    amount: (category.budget / 10.0).round() + day as f64,
                    spent_on: format!("{} purchase", category.name),
                    date: date.to_string(),
                    category_id: category.id,
                    source_id: Some(if day % 2 == 0 { cash.id } else { card.id }),
                    created_at: now,
                },
                &conn,
            )?;
            transaction_count += 1;
        }
    }

    println!(
        "Created {} categories and {transaction_count} transactions.",
        categories.len()
    );
    println!("Log in with {DEMO_EMAIL} and the password \"{DEMO_PASSWORD}\".");
    println!("Success!");

    Ok(())
}
