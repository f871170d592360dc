//! Seed the database with demo accounts and products.
//!
//! Creates a demo buyer, two Chennai sellers with stored coordinates, one
//! seller without a location, and a handful of products. Every account
//! gets the password `password123`. Re-running skips accounts that
//! already exist.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use sqlx::PgPool;
use tracing::info;

use nani_connect_core::{Coordinates, Price};

use super::migrate::database_url;

/// Password shared by all seeded accounts.
const DEMO_PASSWORD: &str = "password123";

struct SeedUser {
    email: &'static str,
    role: &'static str,
    coordinates: Option<Coordinates>,
    products: &'static [(&'static str, &'static str, &'static str)],
}

/// Demo data: sellers are placed around central Chennai so two of them
/// fall inside the 2 km nearby radius of the T. Nagar area.
const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        email: "buyer@example.com",
        role: "buyer",
        coordinates: None,
        products: &[],
    },
    SeedUser {
        email: "kavitha.crafts@example.com",
        role: "seller",
        coordinates: Some(Coordinates::new(13.0827, 80.2707)),
        products: &[
            ("Handloom cotton saree", "Woven in Kanchipuram, natural dyes.", "45.00"),
            ("Terracotta lamp", "Hand-thrown clay lamp for the veranda.", "12.50"),
        ],
    },
    SeedUser {
        email: "mani.spices@example.com",
        role: "seller",
        coordinates: Some(Coordinates::new(13.0900, 80.2800)),
        products: &[
            ("Sambar powder", "Stone-ground blend, 250g pouch.", "6.00"),
            ("Filter coffee beans", "Peaberry roast from the Nilgiris.", "9.75"),
        ],
    },
    SeedUser {
        email: "lakshmi.pickles@example.com",
        role: "seller",
        coordinates: None,
        products: &[("Mango thokku", "Sun-cured mango pickle, 500g jar.", "5.25")],
    },
];

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if the environment is missing the database URL or a
/// query fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;
    let pool = PgPool::connect(secrecy::ExposeSecret::expose_secret(&database_url)).await?;
    info!("Connected to database");

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|e| format!("failed to hash demo password: {e}"))?
        .to_string();

    let mut created = 0usize;
    for user in SEED_USERS {
        let Some(user_id) = insert_user(&pool, user, &password_hash).await? else {
            info!(email = user.email, "already exists, skipping");
            continue;
        };
        created += 1;

        for (name, description, price) in user.products {
            let price = Price::parse(price).map_err(|e| format!("bad seed price: {e}"))?;
            sqlx::query(
                r"
                INSERT INTO products (name, description, price, seller_id)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(user_id)
            .execute(&pool)
            .await?;
        }
    }

    info!(created, "Seeding complete!");
    info!("All demo accounts use the password \"{DEMO_PASSWORD}\"");
    Ok(())
}

/// Insert one account, returning its ID or `None` when the email exists.
async fn insert_user(
    pool: &PgPool,
    user: &SeedUser,
    password_hash: &str,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r"
        INSERT INTO users (email, password_hash, role, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        ",
    )
    .bind(user.email)
    .bind(password_hash)
    .bind(user.role)
    .bind(user.coordinates.map(|c| c.latitude))
    .bind(user.coordinates.map(|c| c.longitude))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id,)| id))
}
