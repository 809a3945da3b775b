use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime, Time};

use ledgerly::{
    CategoryName, NewCategory, NewTransaction, PasswordHash, TransactionType, create_category,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the API server of ledgerly.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has a single user "test@example.com" with the password "test".
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

    println!("Creating test user...");

    let password_hash = PasswordHash::new("test", PasswordHash::DEFAULT_COST)?;
    let user = create_user(
        EmailAddress::from_str("test@example.com")?,
        "Test User",
        password_hash,
        &conn,
    )?;

    println!("Creating categories...");

    let mut categories = Vec::new();
    for (name, color, icon) in [
        ("Salary", "#22C55E", "💰"),
        ("Groceries", "#F97316", "🛒"),
        ("Rent", "#EF4444", "🏠"),
        ("Fun", "#A855F7", "🎉"),
    ] {
        let category = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new(name)?,
                color: color.to_owned(),
                icon: icon.to_owned(),
            },
            &conn,
        )?;
        categories.push(category);
    }

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);

    for week in 0..8 {
        let date = today - Duration::weeks(week);

        let transactions = [
            (0, Decimal::new(125000, 2), TransactionType::Income, "Pay"),
            (
                1,
                Decimal::new(8650 + 125 * week, 2),
                TransactionType::Expense,
                "Weekly shop",
            ),
            (2, Decimal::new(45000, 2), TransactionType::Expense, "Rent"),
            (
                3,
                Decimal::new(2000 + 500 * (week % 3), 2),
                TransactionType::Expense,
                "Movies",
            ),
        ];

        for (category_index, amount, transaction_type, description) in transactions {
            create_transaction(
                user.id,
                NewTransaction {
                    category_id: categories[category_index].id,
                    description: Some(description.to_owned()),
                    amount,
                    transaction_type,
                    date,
                },
                &conn,
            )?;
        }
    }

    println!("Success!");

    Ok(())
}
