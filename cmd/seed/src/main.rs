//! Development seeder: creates an admin, two farmers and a pair of
//! listings, then prints bearer tokens for poking the API by hand.

use anyhow::Context;
use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use auth_adapters::issue_token;
use configs::Settings;
use domains::models::{Ad, AdStatus, Role, User};
use domains::ports::{AdRepo, UserRepo};
use storage_adapters::SqliteStore;

fn user(name: &str, email: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: name.to_string(),
        role,
        disabled: false,
        mobile_number: Some("9800000000".to_string()),
        photo_url: None,
        created_at: Utc::now(),
    }
}

fn listing(owner: Uuid, title: &str, category: &str, price: i64, status: AdStatus) -> Ad {
    let now = Utc::now();
    Ad {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{title}, available for inspection on the farm."),
        category: category.to_string(),
        subcategory: None,
        price,
        location: "Kolhapur".to_string(),
        taluka: Some("Karvir".to_string()),
        photos: Vec::new(),
        mobile_number: Some("9800000000".to_string()),
        user_id: owner,
        status,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configs::load_dotenv();
    let settings = Settings::load().context("loading settings")?;
    let store = SqliteStore::connect(&settings.database.url)
        .await
        .context("opening sqlite store")?;

    let accounts = [
        user("Asha", "asha@gram-bazaar.test", Role::Admin),
        user("Balu", "balu@gram-bazaar.test", Role::Farmer),
        user("Chandra", "chandra@gram-bazaar.test", Role::Farmer),
    ];
    for account in &accounts {
        UserRepo::insert(&store, account)
            .await
            .with_context(|| format!("seeding user {}", account.email))?;
    }

    let ads = [
        listing(accounts[1].id, "45 HP tractor", "equipment", 250_000, AdStatus::Approved),
        listing(accounts[1].id, "Jersey cow, second lactation", "livestock", 65_000, AdStatus::Pending),
        listing(accounts[2].id, "Drip irrigation kit, 1 acre", "equipment", 18_000, AdStatus::Approved),
    ];
    for ad in &ads {
        AdRepo::insert(&store, ad)
            .await
            .with_context(|| format!("seeding ad {}", ad.title))?;
    }

    let secret = settings.auth.jwt_secret.expose_secret().as_bytes().to_vec();
    println!("seeded {} users and {} ads", accounts.len(), ads.len());
    for account in &accounts {
        let token = issue_token(&secret, account.id, settings.auth.token_ttl_hours)
            .context("issuing dev token")?;
        println!("{:<22} {:?}  {token}", account.email, account.role);
    }
    Ok(())
}
