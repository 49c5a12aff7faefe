use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    Amount, NewExpense, PasswordHash, TEST_PASSWORD, create_expense, initialize_db,
    seed_default_categories, seed_test_user,
};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Sample expenses as (name, amount in cents, days ago, category ID).
const SAMPLE_EXPENSES: [(&str, i64, i64, i32); 6] = [
    ("Coffee", 450, 0, 1),
    ("Weekly groceries", 12_380, 2, 1),
    ("Cinema tickets", 3_200, 5, 2),
    ("Headphones", 19_999, 20, 3),
    ("Power bill", 15_610, 45, 4),
    ("Winter jacket", 24_900, 100, 5),
];

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
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;
    seed_default_categories(&connection)?;

    println!("Creating test user...");
    let Some(user) = seed_test_user(&connection, PasswordHash::DEFAULT_COST)? else {
        eprintln!("The new database already has users!");
        exit(1);
    };

    println!("Creating sample expenses...");
    let today = OffsetDateTime::now_utc().date();

    for (name, cents, days_ago, category_id) in SAMPLE_EXPENSES {
        create_expense(
            NewExpense {
                name: name.to_owned(),
                amount: Amount::new(Decimal::new(cents, 2))?,
                purchase_date: today - Duration::days(days_ago),
                category_id,
                user_id: user.id,
            },
            &connection,
        )?;
    }

    println!(
        "Success! Log in as \"{}\" with the password \"{TEST_PASSWORD}\".",
        user.username
    );

    Ok(())
}
